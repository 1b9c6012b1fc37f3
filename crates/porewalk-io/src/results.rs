//! The final results document.
//!
//! One top-level JSON object with run metadata, pathway summary statistics,
//! time-averaged profiles on the common support grid, scalar and profile
//! time series and per-residue tables. The per-frame stream is appended
//! line by line after the document, then deleted.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use log::info;
use porewalk_core::Result;
use porewalk_stats::SummaryStatistics;
use serde::{Deserialize, Serialize};

/// Scalar summary in export form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sd: f64,
}

impl From<&SummaryStatistics> for SummaryRecord {
    fn from(stats: &SummaryStatistics) -> Self {
        SummaryRecord {
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            sd: stats.sd(),
        }
    }
}

/// Column-oriented summary of a profile over the support grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub mean: Vec<f64>,
    pub sd: Vec<f64>,
}

impl From<&[SummaryStatistics]> for ProfileRecord {
    fn from(stats: &[SummaryStatistics]) -> Self {
        ProfileRecord {
            min: stats.iter().map(|s| s.min()).collect(),
            max: stats.iter().map(|s| s.max()).collect(),
            mean: stats.iter().map(|s| s.mean()).collect(),
            sd: stats.iter().map(|s| s.sd()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub creator: String,
    pub generated: String,
    pub num_frames: usize,
    pub num_failed_frames: usize,
}

impl RunMetadata {
    pub fn new(num_frames: usize, num_failed_frames: usize) -> Self {
        RunMetadata {
            creator: format!("porewalk {}", env!("CARGO_PKG_VERSION")),
            generated: Utc::now().to_rfc3339(),
            num_frames,
            num_failed_frames,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayProfile {
    pub support_points: Vec<f64>,
    pub radius: ProfileRecord,
    pub density: ProfileRecord,
    pub energy: ProfileRecord,
    pub pl_hydrophobicity: ProfileRecord,
    pub pf_hydrophobicity: ProfileRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarTimeSeries {
    pub time: Vec<f64>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidueSummaryTable {
    pub res_id: Vec<i64>,
    pub res_name: Vec<String>,
    pub hydrophobicity: Vec<f64>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, ProfileRecord>,
}

/// The complete results document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDocument {
    pub metadata: RunMetadata,
    pub pathway_summary: BTreeMap<String, SummaryRecord>,
    pub pathway_profile: PathwayProfile,
    pub pathway_scalar_time_series: ScalarTimeSeries,
    pub pathway_profile_time_series: BTreeMap<String, Vec<Vec<f64>>>,
    pub residue_summary: ResidueSummaryTable,
}

/// Writes the results document followed by the per-frame stream, then
/// removes the stream file.
pub fn write_results(
    out_path: &Path,
    document: &ResultsDocument,
    stream_path: &Path,
) -> Result<()> {
    {
        let mut out = BufWriter::new(File::create(out_path)?);
        serde_json::to_writer(&mut out, document)?;
        out.write_all(b"\n")?;
    }

    // append per-frame data line by line:
    let stream = BufReader::new(File::open(stream_path)?);
    let mut out = BufWriter::new(OpenOptions::new().append(true).open(out_path)?);
    let mut copied = 0usize;
    for line in stream.lines() {
        let line = line?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        copied += 1;
    }
    out.flush()?;
    drop(out);

    fs::remove_file(stream_path)?;
    info!(
        "wrote results to {} ({} per-frame records appended)",
        out_path.display(),
        copied
    );
    Ok(())
}
