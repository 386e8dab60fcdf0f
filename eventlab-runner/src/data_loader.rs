//! Bar loading and data resolution for the runner.
//!
//! Given a list of symbols, reads `<SYMBOL>.csv` from a data directory and
//! returns aligned bar data. Fallback policy:
//! 1. If the CSV file exists → parse it
//! 2. If not and `synthetic` is set → generate synthetic bars (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only debug mode. Results produced on
//! synthetic data carry `has_synthetic = true`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use eventlab_core::data::{pad_forward, AlignedData};
use eventlab_core::domain::{Bar, Symbol, Timestamp};

/// Calendar days of synthetic history generated when no span is given.
pub const DEFAULT_SYNTHETIC_DAYS: i64 = 730;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data file for '{symbol}' at {path} (set synthetic = true for synthetic data)")]
    MissingFile { symbol: String, path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} row {row}: {reason}")]
    Malformed {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("{path} contains no bars")]
    Empty { path: PathBuf },
}

/// Where a symbol's bars came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    Csv(PathBuf),
    Synthetic,
}

/// Column layout of the price files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CsvLayout {
    /// `timestamp, open, high, low, close, adj_close, volume`.
    #[default]
    Ohlcv,
    /// `timestamp, adj_close`. Every price field takes the adjusted close
    /// and volume is zero.
    AdjCloseOnly,
}

impl CsvLayout {
    fn columns(self) -> usize {
        match self {
            Self::Ohlcv => 7,
            Self::AdjCloseOnly => 2,
        }
    }
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub layout: CsvLayout,
    /// Generate synthetic bars for symbols with no CSV file.
    pub synthetic: bool,
    /// First calendar day of synthetic history.
    pub synthetic_start: NaiveDate,
    /// Last calendar day of synthetic history (inclusive).
    pub synthetic_end: NaiveDate,
}

impl LoadOptions {
    /// Synthetic history starting the day after `start`, spanning the default window.
    pub fn from_start(start: Timestamp, synthetic: bool) -> Self {
        let first = start.date() + chrono::Duration::days(1);
        Self {
            layout: CsvLayout::default(),
            synthetic,
            synthetic_start: first,
            synthetic_end: first + chrono::Duration::days(DEFAULT_SYNTHETIC_DAYS),
        }
    }

    pub fn with_layout(mut self, layout: CsvLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Result of loading bars, including data provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Aligned bar data for all symbols.
    pub aligned: AlignedData,
    /// Data origin per symbol.
    pub sources: HashMap<Symbol, DataOrigin>,
    /// Dataset hash for fingerprinting (BLAKE3 over all bar data).
    pub dataset_hash: String,
    /// Whether any symbol used synthetic data.
    pub has_synthetic: bool,
}

/// Load bars for a set of symbols from `data_dir`, with synthetic fallback.
pub fn load_bars(
    symbols: &[Symbol],
    data_dir: &Path,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let mut all_bars: HashMap<Symbol, Vec<Bar>> = HashMap::new();
    let mut sources: HashMap<Symbol, DataOrigin> = HashMap::new();
    let mut has_synthetic = false;

    for symbol in symbols {
        let path = data_dir.join(format!("{symbol}.csv"));

        if path.is_file() {
            let bars = read_csv_bars(symbol, &path, opts.layout)?;
            debug!(symbol = %symbol, bars = bars.len(), path = %path.display(), "loaded bars");
            all_bars.insert(symbol.clone(), bars);
            sources.insert(symbol.clone(), DataOrigin::Csv(path));
            continue;
        }

        if opts.synthetic {
            warn!(
                symbol = %symbol,
                "generating synthetic data, results will be tagged as synthetic"
            );
            let bars = generate_synthetic_bars(symbol, opts.synthetic_start, opts.synthetic_end);
            all_bars.insert(symbol.clone(), bars);
            sources.insert(symbol.clone(), DataOrigin::Synthetic);
            has_synthetic = true;
            continue;
        }

        return Err(LoadError::MissingFile {
            symbol: symbol.clone(),
            path,
        });
    }

    let aligned = pad_forward(all_bars);
    let dataset_hash = compute_dataset_hash(&aligned);

    Ok(LoadedData {
        aligned,
        sources,
        dataset_hash,
        has_synthetic,
    })
}

/// Parse one symbol's price file.
///
/// Columns are positional after a header row, in the order given by
/// `layout`. Header names are not interpreted. In the OHLCV layout an empty
/// `adj_close` falls back to `close`. Rows whose prices are non-finite or
/// inconsistent (high below low, non-positive prices) are rejected. Rows
/// come back sorted by timestamp.
pub fn read_csv_bars(symbol: &str, path: &Path, layout: CsvLayout) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut bars = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let row = i + 1;
        let malformed = |reason: String| LoadError::Malformed {
            path: path.to_path_buf(),
            row,
            reason,
        };
        let expected = layout.columns();
        if record.len() < expected {
            return Err(malformed(format!(
                "expected {expected} columns, found {}",
                record.len()
            )));
        }

        let timestamp = parse_timestamp(&record[0])
            .ok_or_else(|| malformed(format!("unparseable timestamp '{}'", &record[0])))?;
        let price = |idx: usize, name: &str| -> Result<f64, LoadError> {
            record[idx]
                .parse::<f64>()
                .map_err(|_| malformed(format!("bad {name} '{}'", &record[idx])))
        };

        let bar = match layout {
            CsvLayout::Ohlcv => {
                let close = price(4, "close")?;
                let adj_close = if record[5].is_empty() {
                    close
                } else {
                    price(5, "adj_close")?
                };
                let volume = parse_volume(&record[6])
                    .ok_or_else(|| malformed(format!("bad volume '{}'", &record[6])))?;
                Bar {
                    symbol: symbol.to_string(),
                    timestamp,
                    open: price(1, "open")?,
                    high: price(2, "high")?,
                    low: price(3, "low")?,
                    close,
                    adj_close,
                    volume,
                }
            }
            CsvLayout::AdjCloseOnly => {
                let adj_close = price(1, "adj_close")?;
                Bar {
                    symbol: symbol.to_string(),
                    timestamp,
                    open: adj_close,
                    high: adj_close,
                    low: adj_close,
                    close: adj_close,
                    adj_close,
                    volume: 0,
                }
            }
        };

        if bar.is_void() {
            return Err(malformed("non-finite price".to_string()));
        }
        if !bar.is_sane() {
            return Err(malformed(format!(
                "inconsistent prices o={} h={} l={} c={} adj={}",
                bar.open, bar.high, bar.low, bar.close, bar.adj_close
            )));
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`.
fn parse_timestamp(text: &str) -> Option<Timestamp> {
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_volume(text: &str) -> Option<u64> {
    if let Ok(v) = text.parse::<u64>() {
        return Some(v);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v.round() as u64),
        _ => None,
    }
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// The hash covers timestamps and all OHLCV values in sorted symbol order,
/// so it is identical regardless of HashMap iteration order. Padded slots
/// before a symbol's first bar hash as a single zero byte.
pub fn compute_dataset_hash(aligned: &AlignedData) -> String {
    let mut hasher = blake3::Hasher::new();

    for symbol in &aligned.symbols {
        hasher.update(symbol.as_bytes());
        let Some(bars) = aligned.bars.get(symbol) else {
            continue;
        };
        for slot in bars {
            match slot {
                Some(bar) => {
                    hasher.update(&bar.timestamp.and_utc().timestamp().to_le_bytes());
                    hasher.update(&bar.open.to_le_bytes());
                    hasher.update(&bar.high.to_le_bytes());
                    hasher.update(&bar.low.to_le_bytes());
                    hasher.update(&bar.close.to_le_bytes());
                    hasher.update(&bar.adj_close.to_le_bytes());
                    hasher.update(&bar.volume.to_le_bytes());
                }
                None => {
                    hasher.update(&[0u8]);
                }
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}

/// Generate synthetic daily bars for testing/development.
///
/// A random walk from 100.0 over weekdays, seeded from the symbol name.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        if let Some(timestamp) = current.and_hms_opt(0, 0, 0) {
            bars.push(Bar {
                symbol: symbol.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                adj_close: close,
                volume,
            });
        }

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, symbol: &str, body: &str) {
        let mut file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    fn opts(synthetic: bool) -> LoadOptions {
        LoadOptions {
            layout: CsvLayout::Ohlcv,
            synthetic,
            synthetic_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            synthetic_end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        }
    }

    const AAA: &str = "\
price_date,open_price,high_price,low_price,close_price,adj_close_price,volume
2024-01-03,11,12,10,11.5,11.4,2000
2024-01-02,10,11,9,10.5,10.4,1000
";

    #[test]
    fn csv_rows_are_parsed_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA", AAA);
        let bars = read_csv_bars("AAA", &dir.path().join("AAA.csv"), CsvLayout::Ohlcv).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].adj_close, 10.4);
        assert_eq!(bars[1].volume, 2000);
        assert_eq!(bars[1].symbol, "AAA");
    }

    #[test]
    fn datetime_timestamps_and_float_volume() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "X",
            "timestamp,open,high,low,close,adj_close,volume\n2024-01-02 15:30:00,1,2,0.5,1.5,,12.0\n",
        );
        let bars = read_csv_bars("X", &dir.path().join("X.csv"), CsvLayout::Ohlcv).unwrap();
        assert_eq!(bars[0].timestamp.format("%H:%M").to_string(), "15:30");
        assert_eq!(bars[0].adj_close, 1.5);
        assert_eq!(bars[0].volume, 12);
    }

    #[test]
    fn malformed_row_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "X",
            "timestamp,open,high,low,close,adj_close,volume\n2024-01-02,1,2,0.5,1.5,1.5,10\n2024-01-03,abc,2,0.5,1.5,1.5,10\n",
        );
        let err = read_csv_bars("X", &dir.path().join("X.csv"), CsvLayout::Ohlcv).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 2, .. }), "{err}");
    }

    #[test]
    fn non_finite_prices_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        for cell in ["NaN", "inf", "-inf"] {
            write_csv(
                dir.path(),
                "X",
                &format!(
                    "timestamp,open,high,low,close,adj_close,volume\n\
                     2024-01-02,50,50,50,50,50,10\n\
                     2024-01-03,50,50,50,50,{cell},10\n"
                ),
            );
            let err = read_csv_bars("X", &dir.path().join("X.csv"), CsvLayout::Ohlcv).unwrap_err();
            assert!(
                matches!(err, LoadError::Malformed { row: 2, ref reason, .. } if reason.contains("non-finite")),
                "{cell}: {err}"
            );
        }
    }

    #[test]
    fn inconsistent_ohlc_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "X",
            "timestamp,open,high,low,close,adj_close,volume\n2024-01-02,10,9,11,10,10,10\n",
        );
        let err = read_csv_bars("X", &dir.path().join("X.csv"), CsvLayout::Ohlcv).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 1, .. }), "{err}");
    }

    #[test]
    fn adj_close_only_layout_fills_every_price() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "BIO",
            "Date,Adj_Close\n2019-03-05,12.5\n2019-03-04,12.0\n",
        );
        let bars = read_csv_bars("BIO", &dir.path().join("BIO.csv"), CsvLayout::AdjCloseOnly).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.date(), NaiveDate::from_ymd_opt(2019, 3, 4).unwrap());
        let last = &bars[1];
        assert_eq!(
            [last.open, last.high, last.low, last.close, last.adj_close],
            [12.5; 5]
        );
        assert_eq!(last.volume, 0);

        // the seven-column reader refuses a two-column file
        let err = read_csv_bars("BIO", &dir.path().join("BIO.csv"), CsvLayout::Ohlcv).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 1, .. }), "{err}");
    }

    #[test]
    fn load_bars_honours_layout() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "BIO", "Date,Adj_Close\n2019-03-04,12.0\n");
        let options = LoadOptions {
            layout: CsvLayout::AdjCloseOnly,
            ..opts(false)
        };
        let loaded = load_bars(&["BIO".to_string()], dir.path(), &options).unwrap();
        assert_eq!(loaded.aligned.len(), 1);
        assert!(matches!(loaded.sources["BIO"], DataOrigin::Csv(_)));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "X", "timestamp,open,high,low,close,adj_close,volume\n");
        let err = read_csv_bars("X", &dir.path().join("X.csv"), CsvLayout::Ohlcv).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn missing_file_fails_without_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bars(&["NOPE".to_string()], dir.path(), &opts(false)).unwrap_err();
        assert!(matches!(err, LoadError::MissingFile { ref symbol, .. } if symbol == "NOPE"));
    }

    #[test]
    fn synthetic_fallback_produces_tagged_data() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA", AAA);
        let loaded = load_bars(
            &["AAA".to_string(), "SYN".to_string()],
            dir.path(),
            &opts(true),
        )
        .unwrap();
        assert!(loaded.has_synthetic);
        assert_eq!(loaded.sources["SYN"], DataOrigin::Synthetic);
        assert!(matches!(loaded.sources["AAA"], DataOrigin::Csv(_)));
        assert_eq!(loaded.aligned.symbols, vec!["AAA", "SYN"]);
    }

    #[test]
    fn synthetic_data_is_deterministic_per_symbol() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let a = generate_synthetic_bars("SPY", start, end);
        let b = generate_synthetic_bars("SPY", start, end);
        let c = generate_synthetic_bars("QQQ", start, end);
        assert_eq!(a, b);
        assert_ne!(a[0].close, c[0].close);
        assert!(a
            .iter()
            .all(|bar| !matches!(bar.timestamp.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)));
        assert!(a.iter().all(Bar::is_sane));
    }

    #[test]
    fn dataset_hash_is_deterministic_and_data_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA", AAA);
        let symbols = vec!["AAA".to_string()];
        let a = load_bars(&symbols, dir.path(), &opts(false)).unwrap();
        let b = load_bars(&symbols, dir.path(), &opts(false)).unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);

        write_csv(dir.path(), "AAA", &AAA.replace("11.4", "11.3"));
        let c = load_bars(&symbols, dir.path(), &opts(false)).unwrap();
        assert_ne!(a.dataset_hash, c.dataset_hash);
    }

    #[test]
    fn multi_symbol_alignment_pads_forward() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "AAA", AAA);
        write_csv(
            dir.path(),
            "BBB",
            "d,o,h,l,c,a,v\n2024-01-02,5,6,4,5,5,100\n2024-01-04,6,7,5,6,6,100\n",
        );
        let loaded = load_bars(
            &["AAA".to_string(), "BBB".to_string()],
            dir.path(),
            &opts(false),
        )
        .unwrap();
        assert_eq!(loaded.aligned.len(), 3);
        let bbb = &loaded.aligned.bars["BBB"];
        // 01-03 carries 01-02's values forward under the new timestamp.
        let padded = bbb[1].as_ref().unwrap();
        assert_eq!(padded.close, 5.0);
        assert_eq!(padded.timestamp, loaded.aligned.timestamps[1]);
    }
}
