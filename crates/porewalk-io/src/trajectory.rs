//! Trajectory input.
//!
//! The trajectory provider delivers frames as JSON lines, one frame per
//! line (see `porewalk_core::Frame` for the record shape). The reader is a
//! thin collaborator: selection mechanics and periodic-boundary handling
//! happen upstream.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use porewalk_core::{Frame, PorewalkError, Result};

/// Line-by-line frame reader.
pub struct TrajectoryReader {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl TrajectoryReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PorewalkError::input(format!("cannot open trajectory {}: {}", path.display(), e))
        })?;
        Ok(TrajectoryReader {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for TrajectoryReader {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_no += 1;
            match self.lines.next()? {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&line).map_err(|e| {
                        PorewalkError::MalformedFrameRecord {
                            line: self.line_no,
                            message: e.to_string(),
                        }
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
