//! Loading of the raw ratings export.

use ratingscope_common::{normalize_header, Dimension, Month, MonthRange, RatingsError, Result};
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Columns every export must carry, after normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "month",
    "daypart",
    "demographic",
    "characteristic",
    "reach_imp",
    "grp_imp",
];

/// Maps a normalized header onto its canonical column name.
fn canonical_column(header: &str) -> &str {
    match header {
        "reach_%" | "reach_pct" => "reach%",
        "ue" | "universe_estimate" => "universe",
        "period" => "month",
        other => other,
    }
}

/// Parses a numeric cell: thousands separators and a trailing `%` are
/// ignored. Blank cells yield `None`; `NaN` and infinities are rejected.
fn parse_number(raw: &str) -> std::result::Result<Option<f64>, ()> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(()),
    }
}

/// One row of the export: a month and demographic segment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Period of the row.
    pub month: Month,
    /// Daypart label.
    pub daypart: String,
    /// Age level label.
    pub demographic: String,
    /// Income or race label.
    pub characteristic: String,
    /// Reach impressions.
    pub reach_imp: f64,
    /// GRP impressions.
    pub grp_imp: f64,
    /// Reach percentage as exported.
    pub reach_pct: Option<f64>,
    /// Average frequency as exported.
    pub avg_freq: Option<f64>,
    /// Population base of the segment.
    pub universe: Option<f64>,
}

impl RawRecord {
    /// Label of this row in `dimension`.
    pub fn label(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Daypart => &self.daypart,
            Dimension::Demographic => &self.demographic,
            Dimension::Characteristic => &self.characteristic,
        }
    }
}

struct ColumnIndex {
    month: usize,
    daypart: usize,
    demographic: usize,
    characteristic: usize,
    reach_imp: usize,
    grp_imp: usize,
    reach_pct: Option<usize>,
    avg_freq: Option<usize>,
    universe: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord, source: &str) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let normalized = normalize_header(header);
            positions
                .entry(canonical_column(&normalized).to_string())
                .or_insert(index);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !positions.contains_key(*column))
            .collect();
        if !missing.is_empty() {
            return Err(RatingsError::data_format(format!(
                "{source} is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let required = |column: &str| positions.get(column).copied().unwrap_or_default();
        Ok(Self {
            month: required("month"),
            daypart: required("daypart"),
            demographic: required("demographic"),
            characteristic: required("characteristic"),
            reach_imp: required("reach_imp"),
            grp_imp: required("grp_imp"),
            reach_pct: positions.get("reach%").copied(),
            avg_freq: positions.get("avg_freq").copied(),
            universe: positions.get("universe").copied(),
        })
    }
}

/// The parsed export, immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<RawRecord>,
    months: BTreeSet<Month>,
    range: MonthRange,
    has_reach_pct: bool,
    has_avg_freq: bool,
    has_universe: bool,
    skipped: usize,
}

impl Dataset {
    /// Loads the export at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RatingsError::not_found(format!("data file {} does not exist", path.display()))
            } else {
                RatingsError::Io(e)
            }
        })?;
        let mut dataset = Self::from_reader(file, &path.display().to_string())?;
        dataset.source = path.to_path_buf();
        info!(
            rows = dataset.records.len(),
            range = %dataset.month_range(),
            "Loaded ratings export"
        );
        Ok(dataset)
    }

    /// Parses an export from any reader; `source` names it in errors.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(reader.headers()?, source)?;

        let mut records = Vec::new();
        let mut months = BTreeSet::new();
        let mut skipped = 0usize;

        for row in reader.records() {
            let row = row?;
            let line = row.position().map_or(0, csv::Position::line);
            let cell = |index: usize| row.get(index).unwrap_or("");

            let Some(month) = Month::parse_period(cell(columns.month)) else {
                debug!(line, "Skipping row without a valid month");
                skipped += 1;
                continue;
            };

            let number = |index: usize, column: &str| -> Result<Option<f64>> {
                parse_number(cell(index)).map_err(|()| {
                    RatingsError::data_format_at(
                        format!("{source}: cannot parse {column} value '{}'", cell(index)),
                        line,
                    )
                })
            };
            let required = |index: usize, column: &str| -> Result<f64> {
                number(index, column)?.ok_or_else(|| {
                    RatingsError::data_format_at(format!("{source}: {column} is blank"), line)
                })
            };
            let optional = |index: Option<usize>, column: &str| -> Result<Option<f64>> {
                index.map_or(Ok(None), |index| number(index, column))
            };

            let record = RawRecord {
                month,
                daypart: cell(columns.daypart).to_string(),
                demographic: cell(columns.demographic).to_string(),
                characteristic: cell(columns.characteristic).to_string(),
                reach_imp: required(columns.reach_imp, "reach_imp")?,
                grp_imp: required(columns.grp_imp, "grp_imp")?,
                reach_pct: optional(columns.reach_pct, "reach%")?,
                avg_freq: optional(columns.avg_freq, "avg_freq")?,
                universe: optional(columns.universe, "universe")?,
            };
            months.insert(month);
            records.push(record);
        }

        if skipped > 0 {
            warn!(skipped, source, "Skipped rows without a valid month");
        }
        let (Some(&first), Some(&last)) = (months.first(), months.last()) else {
            return Err(RatingsError::data_format(format!(
                "{source} contains no data rows"
            )));
        };

        Ok(Self {
            source: PathBuf::from(source),
            records,
            months,
            range: MonthRange { first, last },
            has_reach_pct: columns.reach_pct.is_some(),
            has_avg_freq: columns.avg_freq.is_some(),
            has_universe: columns.universe.is_some(),
            skipped,
        })
    }

    /// Where the export was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All rows in file order.
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no data rows. Never true for a loaded dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows skipped for lacking a valid month.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// First and last month present.
    pub const fn month_range(&self) -> MonthRange {
        self.range
    }

    /// Whether any row falls in `month`.
    pub fn has_month(&self, month: Month) -> bool {
        self.months.contains(&month)
    }

    /// Whether the export carries a `reach%` column.
    pub const fn has_reach_pct(&self) -> bool {
        self.has_reach_pct
    }

    /// Whether the export carries an `avg_freq` column.
    pub const fn has_avg_freq(&self) -> bool {
        self.has_avg_freq
    }

    /// Whether the export carries a `universe` column.
    pub const fn has_universe(&self) -> bool {
        self.has_universe
    }
}
