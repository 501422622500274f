//! Tabular interchange formats.
//!
//! [`SplitFrame`] is the column-oriented "split" JSON layout
//! (`{"columns": [...], "index": [...], "data": [[...], ...]}`). Outputs are
//! always located by column name, so a producer may order columns however it
//! likes without swapping the open and closed loop series.

use fb_controls::{Sample, SimulationResult};
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

pub const TIME_COLUMN: &str = "time";
pub const OPEN_LOOP_COLUMN: &str = "y_open_loop";
pub const CLOSED_LOOP_COLUMN: &str = "y_closed_loop";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFrame {
    pub columns: Vec<String>,
    pub index: Vec<usize>,
    pub data: Vec<Vec<f64>>,
}

impl SplitFrame {
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            columns: vec![
                TIME_COLUMN.to_string(),
                OPEN_LOOP_COLUMN.to_string(),
                CLOSED_LOOP_COLUMN.to_string(),
            ],
            index: (0..result.len()).collect(),
            data: result
                .iter()
                .map(|s| vec![s.time, s.y_open_loop, s.y_closed_loop])
                .collect(),
        }
    }

    fn column(&self, name: &str) -> ResultsResult<usize> {
        let mut hits = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() == name)
            .map(|(i, _)| i);

        match (hits.next(), hits.next()) {
            (Some(i), None) => Ok(i),
            (None, _) => Err(ResultsError::Frame {
                what: format!("missing column '{name}'"),
            }),
            (Some(_), Some(_)) => Err(ResultsError::Frame {
                what: format!("duplicate column '{name}'"),
            }),
        }
    }

    pub fn to_result(&self) -> ResultsResult<SimulationResult> {
        if self.index.len() != self.data.len() {
            return Err(ResultsError::Frame {
                what: format!(
                    "index has {} entries but data has {} rows",
                    self.index.len(),
                    self.data.len()
                ),
            });
        }

        let t_col = self.column(TIME_COLUMN)?;
        let open_col = self.column(OPEN_LOOP_COLUMN)?;
        let closed_col = self.column(CLOSED_LOOP_COLUMN)?;

        let mut samples = Vec::with_capacity(self.data.len());
        for (row_no, row) in self.data.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(ResultsError::Frame {
                    what: format!(
                        "row {row_no} has {} values, expected {}",
                        row.len(),
                        self.columns.len()
                    ),
                });
            }
            samples.push(Sample {
                time: row[t_col],
                y_open_loop: row[open_col],
                y_closed_loop: row[closed_col],
            });
        }

        // Rows follow the index, not their position in `data`.
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        let samples = order.into_iter().map(|i| samples[i]).collect();

        Ok(SimulationResult { samples })
    }

    pub fn to_json(&self) -> ResultsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> ResultsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// CSV with a `time,y_open_loop,y_closed_loop` header.
pub fn to_csv(result: &SimulationResult) -> String {
    let mut csv = format!("{TIME_COLUMN},{OPEN_LOOP_COLUMN},{CLOSED_LOOP_COLUMN}\n");
    for s in result {
        csv.push_str(&format!("{},{},{}\n", s.time, s.y_open_loop, s.y_closed_loop));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_result() -> SimulationResult {
        SimulationResult::from(vec![
            Sample {
                time: 0.0,
                y_open_loop: 0.0,
                y_closed_loop: 0.0,
            },
            Sample {
                time: 1.0,
                y_open_loop: 1.5,
                y_closed_loop: 0.75,
            },
        ])
    }

    #[test]
    fn json_layout_is_split_orientation() {
        let json = SplitFrame::from_result(&tiny_result()).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"columns":["time","y_open_loop","y_closed_loop"],"index":[0,1],"data":[[0.0,0.0,0.0],[1.0,1.5,0.75]]}"#
        );
    }

    #[test]
    fn columns_are_matched_by_name() {
        let json = r#"{"columns":["y_closed_loop","time","y_open_loop"],"index":[0,1],"data":[[0.0,0.0,0.0],[0.75,1.0,1.5]]}"#;
        let result = SplitFrame::from_json(json).unwrap().to_result().unwrap();
        assert_eq!(result, tiny_result());
    }

    #[test]
    fn rows_follow_index_order() {
        let json = r#"{"columns":["time","y_open_loop","y_closed_loop"],"index":[1,0],"data":[[1.0,1.5,0.75],[0.0,0.0,0.0]]}"#;
        let result = SplitFrame::from_json(json).unwrap().to_result().unwrap();
        assert_eq!(result, tiny_result());
    }

    #[test]
    fn positional_frames_are_rejected() {
        // Integer column labels carry no meaning; refuse rather than guess.
        let frame = SplitFrame {
            columns: vec!["0".into(), "1".into(), "2".into()],
            index: vec![0],
            data: vec![vec![0.0, 0.0, 0.0]],
        };
        let err = frame.to_result().unwrap_err();
        assert!(err.to_string().contains("missing column 'time'"));
    }

    #[test]
    fn ragged_and_mismatched_frames_are_rejected() {
        let mut frame = SplitFrame::from_result(&tiny_result());
        frame.data[1].pop();
        assert!(frame.to_result().is_err());

        let mut frame = SplitFrame::from_result(&tiny_result());
        frame.index.push(2);
        assert!(frame.to_result().is_err());

        let mut frame = SplitFrame::from_result(&tiny_result());
        frame.columns[2] = TIME_COLUMN.to_string();
        assert!(frame.to_result().is_err());
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = to_csv(&tiny_result());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["time,y_open_loop,y_closed_loop", "0,0,0", "1,1.5,0.75"]);
    }
}
