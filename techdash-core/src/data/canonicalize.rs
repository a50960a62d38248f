//! Canonicalization of loaded tables: sort, dedupe, report anomalies.
//!
//! Rows are never dropped for being implausible; the engine sees every date
//! the source delivered, once, in ascending order.

use std::collections::HashSet;

use crate::domain::{PriceSeries, CLOSE, HIGH, LOW, OPEN, VOLUME};

pub struct Canonicalizer;

/// A canonical table plus whatever looked wrong on the way in.
#[derive(Debug)]
pub struct Canonicalized {
    pub series: PriceSeries,
    pub anomalies: Vec<AnomalyReport>,
}

impl Canonicalizer {
    /// Stable-sort by date and keep the first row for each date.
    pub fn canonicalize(series: &PriceSeries) -> Canonicalized {
        let mut anomalies = Vec::new();

        let unsorted = series.dates().windows(2).filter(|w| w[1] < w[0]).count();
        if unsorted > 0 {
            anomalies.push(AnomalyReport {
                anomaly_type: AnomalyType::Unsorted,
                count: unsorted,
                severity: Severity::Info,
            });
        }

        let mut rows: Vec<usize> = (0..series.len()).collect();
        rows.sort_by_key(|&i| series.dates()[i]);

        let mut seen = HashSet::with_capacity(rows.len());
        let before = rows.len();
        rows.retain(|&i| seen.insert(series.dates()[i]));
        let duplicates = before - rows.len();
        if duplicates > 0 {
            anomalies.push(AnomalyReport {
                anomaly_type: AnomalyType::DuplicateDate,
                count: duplicates,
                severity: Severity::Warning,
            });
        }

        let canonical = series.select_rows(&rows);
        anomalies.extend(Self::detect_anomalies(&canonical));

        Canonicalized {
            series: canonical,
            anomalies,
        }
    }

    /// Detect implausible bars and zero volume.
    pub fn detect_anomalies(series: &PriceSeries) -> Vec<AnomalyReport> {
        let mut anomalies = Vec::new();

        if let Some(volume) = series.column(VOLUME) {
            let zero_volume_count = volume.iter().filter(|&&v| v == 0.0).count();
            if zero_volume_count > 0 {
                anomalies.push(AnomalyReport {
                    anomaly_type: AnomalyType::ZeroVolume,
                    count: zero_volume_count,
                    severity: Severity::Warning,
                });
            }
        }

        let all_ohlc = [OPEN, HIGH, LOW, CLOSE]
            .iter()
            .all(|c| series.has_column(c));
        if all_ohlc {
            let inverted = (0..series.len())
                .filter_map(|i| series.bar(i))
                .filter(|b| !b.is_void() && !b.is_sane())
                .count();
            if inverted > 0 {
                anomalies.push(AnomalyReport {
                    anomaly_type: AnomalyType::InconsistentBar,
                    count: inverted,
                    severity: Severity::Warning,
                });
            }
        }

        if let Some(close) = series.column(CLOSE) {
            let missing = close.iter().filter(|v| v.is_nan()).count();
            if missing > 0 {
                anomalies.push(AnomalyReport {
                    anomaly_type: AnomalyType::MissingClose,
                    count: missing,
                    severity: Severity::Warning,
                });
            }
        }

        anomalies
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyReport {
    pub anomaly_type: AnomalyType,
    pub count: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyType {
    Unsorted,
    DuplicateDate,
    ZeroVolume,
    InconsistentBar,
    MissingClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn table(days: &[u32], closes: &[f64]) -> PriceSeries {
        PriceSeries::new("SPY", days.iter().map(|&x| d(x)).collect())
            .with_column(CLOSE, closes.to_vec())
            .unwrap()
    }

    #[test]
    fn sorts_data() {
        let out = Canonicalizer::canonicalize(&table(&[3, 1, 2], &[3.0, 1.0, 2.0]));
        assert_eq!(out.series.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(out.series.column(CLOSE).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(out.anomalies[0].anomaly_type, AnomalyType::Unsorted);
    }

    #[test]
    fn removes_duplicates_keeping_first() {
        let out = Canonicalizer::canonicalize(&table(&[1, 1, 2], &[100.0, 101.0, 102.0]));
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series.column(CLOSE).unwrap(), &[100.0, 102.0]);
        assert!(out.anomalies.contains(&AnomalyReport {
            anomaly_type: AnomalyType::DuplicateDate,
            count: 1,
            severity: Severity::Warning,
        }));
    }

    #[test]
    fn clean_table_has_no_anomalies() {
        let out = Canonicalizer::canonicalize(&table(&[1, 2, 3], &[1.0, 2.0, 3.0]));
        assert!(out.anomalies.is_empty());
    }

    #[test]
    fn flags_inverted_bar_without_dropping_it() {
        let s = table(&[1, 2], &[102.0, 103.0])
            .with_column(OPEN, vec![100.0, 100.0])
            .unwrap()
            .with_column(HIGH, vec![95.0, 105.0])
            .unwrap()
            .with_column(LOW, vec![105.0, 99.0])
            .unwrap();
        let out = Canonicalizer::canonicalize(&s);
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.anomalies.len(), 1);
        assert_eq!(out.anomalies[0].anomaly_type, AnomalyType::InconsistentBar);
    }

    #[test]
    fn flags_zero_volume_and_missing_close() {
        let s = table(&[1, 2, 3], &[1.0, f64::NAN, 3.0])
            .with_column(VOLUME, vec![0.0, 1000.0, 0.0])
            .unwrap();
        let anomalies = Canonicalizer::detect_anomalies(&s);
        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::ZeroVolume);
        assert_eq!(anomalies[0].count, 2);
        assert_eq!(anomalies[1].anomaly_type, AnomalyType::MissingClose);
        assert_eq!(anomalies[1].count, 1);
    }
}
