//! Command-line surface and its translation into analysis options.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use porewalk_core::{PorewalkError, Result, Vec3};
use porewalk_io::{
    HydrophobicityDatabase, HydrophobicityScale, VdwRadiusDatabase, VdwRadiusTable,
};
use porewalk_optim::{AnnealingConfig, NelderMeadConfig};
use porewalk_pathfind::{MappingParams, PathFindingMethod};
use porewalk_pipeline::{
    AggregationConfig, AnalysisOptions, DensityMethod, DensityOptions, PathAlignmentMethod,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PfMethodArg {
    #[value(name = "naive_cylindrical")]
    NaiveCylindrical,
    #[value(name = "inplane_optim")]
    InplaneOptim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VdwDatabaseArg {
    #[value(name = "hole_simple")]
    HoleSimple,
    #[value(name = "hole_amberuni")]
    HoleAmberuni,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignMethodArg {
    None,
    Ipp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DensityMethodArg {
    Histogram,
    Kernel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HydrophobicityDatabaseArg {
    #[value(name = "wimley_white_1996")]
    WimleyWhite1996,
    #[value(name = "kyte_doolittle_1982")]
    KyteDoolittle1982,
    User,
}

/// Annotates ion-channel trajectories with a pathway, radius profile,
/// solvent density and hydrophobicity profiles.
#[derive(Debug, Parser)]
#[command(name = "porewalk", version, about)]
pub struct Cli {
    /// Trajectory input: one JSON frame record per line
    #[arg(long, value_name = "FILE")]
    pub trajectory: PathBuf,

    /// Base name for output files; extensions are added internally
    #[arg(long, default_value = "output")]
    pub out_filename: String,

    /// Number of support points for time-averaged profiles
    #[arg(long, default_value_t = 1000)]
    pub out_num_points: usize,

    /// Extension of the profile grid beyond the observed arc-length range
    #[arg(long, default_value_t = 0.0)]
    pub out_extrap_dist: f64,

    /// Path finding method
    #[arg(long, value_enum, default_value_t = PfMethodArg::InplaneOptim)]
    pub pf_method: PfMethodArg,

    /// Van der Waals radius database
    #[arg(long, value_enum, default_value_t = VdwDatabaseArg::HoleSimple)]
    pub pf_vdwr_database: VdwDatabaseArg,

    /// Fallback radius for atoms missing from the database; negative
    /// disables the fallback and missing atoms become an error
    #[arg(long, default_value_t = -1.0)]
    pub pf_vdwr_fallback: f64,

    /// User radius JSON file (used with --pf-vdwr-database user)
    #[arg(long, value_name = "FILE")]
    pub pf_vdwr_json: Option<PathBuf>,

    /// Pathway alignment across frames
    #[arg(long, value_enum, default_value_t = AlignMethodArg::Ipp)]
    pub pf_align_method: AlignMethodArg,

    /// Probe step length
    #[arg(long, default_value_t = 0.025)]
    pub pf_probe_step: f64,

    /// Maximum free distance; the probe has left the pore beyond this
    #[arg(long, default_value_t = 1.0)]
    pub pf_max_free_dist: f64,

    /// Maximum number of probe steps per walk direction
    #[arg(long, default_value_t = 10000)]
    pub pf_max_probe_steps: usize,

    /// Explicit initial probe position (x y z); defaults to the reference
    /// selection's centre of mass
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    pub pf_init_probe_pos: Option<Vec<f64>>,

    /// Residue ids whose centre of mass seeds the probe when no explicit
    /// position is given
    #[arg(long, value_delimiter = ',')]
    pub pf_sel_ipp: Option<Vec<i64>>,

    /// Channel direction vector (normalised internally)
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [0.0, 0.0, 1.0])]
    pub pf_chan_dir_vec: Vec<f64>,

    /// Neighbourhood cutoff for obstacle searches; zero or negative
    /// disables the cutoff
    #[arg(long, default_value_t = 0.0)]
    pub pf_cutoff: f64,

    /// Simulated annealing seed
    #[arg(long, default_value_t = 15011991)]
    pub sa_seed: u64,

    /// Simulated annealing cooling iterations
    #[arg(long, default_value_t = 5000)]
    pub sa_max_iter: usize,

    /// Simulated annealing initial temperature
    #[arg(long, default_value_t = 0.1)]
    pub sa_init_temp: f64,

    /// Simulated annealing cooling factor
    #[arg(long, default_value_t = 0.98)]
    pub sa_cooling_fac: f64,

    /// Simulated annealing candidate step length
    #[arg(long, default_value_t = 0.001)]
    pub sa_step: f64,

    /// Nelder-Mead polish iterations
    #[arg(long, default_value_t = 100)]
    pub nm_max_iter: usize,

    /// Distance of vertices in the initial Nelder-Mead simplex
    #[arg(long, default_value_t = 0.1)]
    pub nm_init_shift: f64,

    /// Margin on the local radius for the pore-lining test
    #[arg(long, default_value_t = 0.75)]
    pub pm_pl_margin: f64,

    /// Density estimation method
    #[arg(long, value_enum, default_value_t = DensityMethodArg::Kernel)]
    pub de_method: DensityMethodArg,

    /// Density resolution: bin width (histogram) or evaluation point
    /// spacing (kernel)
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.01)]
    pub de_res: f64,

    /// Kernel bandwidth; non-positive selects the AMISE-optimal value
    #[arg(long, default_value_t = -1.0)]
    pub de_bandwidth: f64,

    /// Scaling factor applied to the bandwidth
    #[arg(long, default_value_t = 1.0)]
    pub de_bw_scale: f64,

    /// Kernel evaluation range cutoff in multiples of the bandwidth
    #[arg(long, default_value_t = 5.0)]
    pub de_eval_cutoff: f64,

    /// Hydrophobicity database
    #[arg(long, value_enum, default_value_t = HydrophobicityDatabaseArg::WimleyWhite1996)]
    pub hydrophob_database: HydrophobicityDatabaseArg,

    /// Fallback hydrophobicity for residues missing from the database
    #[arg(long)]
    pub hydrophob_fallback: Option<f64>,

    /// User hydrophobicity JSON file (used with --hydrophob-database user)
    #[arg(long, value_name = "FILE")]
    pub hydrophob_json: Option<PathBuf>,

    /// Bandwidth of the hydrophobicity kernel smoother
    #[arg(long, default_value_t = 0.35)]
    pub hydrophob_bandwidth: f64,

    /// Worker threads for frame analysis; 0 uses the available parallelism
    #[arg(long, default_value_t = 0)]
    pub num_threads: usize,
}

impl Cli {
    /// Loads the radius table configured on the command line.
    pub fn vdw_table(&self) -> Result<VdwRadiusTable> {
        let table = match self.pf_vdwr_database {
            VdwDatabaseArg::HoleSimple => VdwRadiusTable::builtin(VdwRadiusDatabase::HoleSimple)?,
            VdwDatabaseArg::HoleAmberuni => {
                VdwRadiusTable::builtin(VdwRadiusDatabase::HoleAmberuni)?
            }
            VdwDatabaseArg::User => {
                let path = self.pf_vdwr_json.as_ref().ok_or_else(|| {
                    PorewalkError::config(
                        "--pf-vdwr-database user requires --pf-vdwr-json <FILE>",
                    )
                })?;
                VdwRadiusTable::from_file(path)?
            }
        };
        let fallback = (self.pf_vdwr_fallback > 0.0).then_some(self.pf_vdwr_fallback);
        Ok(table.with_fallback(fallback))
    }

    /// Loads the hydrophobicity scale configured on the command line.
    pub fn hydrophobicity_scale(&self) -> Result<HydrophobicityScale> {
        let scale = match self.hydrophob_database {
            HydrophobicityDatabaseArg::WimleyWhite1996 => {
                HydrophobicityScale::builtin(HydrophobicityDatabase::WimleyWhite1996)?
            }
            HydrophobicityDatabaseArg::KyteDoolittle1982 => {
                HydrophobicityScale::builtin(HydrophobicityDatabase::KyteDoolittle1982)?
            }
            HydrophobicityDatabaseArg::User => {
                let path = self.hydrophob_json.as_ref().ok_or_else(|| {
                    PorewalkError::config(
                        "--hydrophob-database user requires --hydrophob-json <FILE>",
                    )
                })?;
                HydrophobicityScale::from_file(path)?
            }
        };
        Ok(scale.with_fallback(self.hydrophob_fallback))
    }

    /// Builds the per-frame analysis options. Component-level validation
    /// (annealing parameters, probe geometry) happens when the analyser
    /// constructs its pathfinder.
    pub fn analysis_options(&self) -> Result<AnalysisOptions> {
        if self.de_res <= 0.0 {
            return Err(PorewalkError::config(format!(
                "density resolution must be positive, got {}",
                self.de_res
            )));
        }
        if self.de_bw_scale <= 0.0 {
            return Err(PorewalkError::config(format!(
                "bandwidth scale must be positive, got {}",
                self.de_bw_scale
            )));
        }

        let init_probe_pos = match &self.pf_init_probe_pos {
            Some(v) if v.len() == 3 => Some(Vec3::new(v[0], v[1], v[2])),
            Some(_) => {
                return Err(PorewalkError::config(
                    "--pf-init-probe-pos requires exactly three components",
                ))
            }
            None => None,
        };
        if self.pf_chan_dir_vec.len() != 3 {
            return Err(PorewalkError::config(
                "--pf-chan-dir-vec requires exactly three components",
            ));
        }
        let chan_dir = Vec3::new(
            self.pf_chan_dir_vec[0],
            self.pf_chan_dir_vec[1],
            self.pf_chan_dir_vec[2],
        );

        Ok(AnalysisOptions {
            pf_method: match self.pf_method {
                PfMethodArg::NaiveCylindrical => PathFindingMethod::NaiveCylindrical,
                PfMethodArg::InplaneOptim => PathFindingMethod::InplaneOptimised,
            },
            init_probe_pos,
            ipp_res_ids: self.pf_sel_ipp.clone(),
            chan_dir,
            probe_step: self.pf_probe_step,
            max_probe_radius: self.pf_max_free_dist,
            max_probe_steps: self.pf_max_probe_steps,
            cutoff: (self.pf_cutoff > 0.0).then_some(self.pf_cutoff),
            annealing: AnnealingConfig {
                seed: self.sa_seed,
                max_cooling_iter: self.sa_max_iter,
                init_temp: self.sa_init_temp,
                cooling_factor: self.sa_cooling_fac,
                step_length_factor: self.sa_step,
            },
            nelder_mead: NelderMeadConfig {
                max_iter: self.nm_max_iter,
                init_shift: self.nm_init_shift,
            },
            align_method: match self.pf_align_method {
                AlignMethodArg::None => PathAlignmentMethod::None,
                AlignMethodArg::Ipp => PathAlignmentMethod::Ipp,
            },
            mapping: MappingParams::default(),
            pore_mapping_margin: self.pm_pl_margin,
            density: DensityOptions {
                method: match self.de_method {
                    DensityMethodArg::Histogram => DensityMethod::Histogram,
                    DensityMethodArg::Kernel => DensityMethod::Kernel,
                },
                resolution: self.de_res,
                bandwidth: self.de_bandwidth,
                bandwidth_scale: self.de_bw_scale,
                eval_range_cutoff: self.de_eval_cutoff,
            },
            hydrophobicity_bandwidth: self.hydrophob_bandwidth,
        })
    }

    pub fn aggregation_config(&self) -> AggregationConfig {
        AggregationConfig {
            num_out_points: self.out_num_points,
            extrap_dist: self.out_extrap_dist,
        }
    }

    pub fn worker_threads(&self) -> usize {
        if self.num_threads > 0 {
            self.num_threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(
            std::iter::once("porewalk").chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn defaults_mirror_reference_configuration() {
        let cli = parse(&["--trajectory", "traj.jsonl"]);
        assert_eq!(cli.pf_method, PfMethodArg::InplaneOptim);
        assert_eq!(cli.pf_probe_step, 0.025);
        assert_eq!(cli.pf_max_free_dist, 1.0);
        assert_eq!(cli.sa_cooling_fac, 0.98);
        assert_eq!(cli.de_bandwidth, -1.0);
        assert_eq!(cli.out_num_points, 1000);
        assert_eq!(cli.hydrophob_bandwidth, 0.35);
    }

    #[test]
    fn unknown_options_are_rejected() {
        assert!(Cli::try_parse_from(["porewalk", "--trajectory", "t", "--no-such-flag"]).is_err());
    }

    #[test]
    fn trajectory_is_required() {
        assert!(Cli::try_parse_from(["porewalk"]).is_err());
    }

    #[test]
    fn user_database_requires_file_argument() {
        let cli = parse(&["--trajectory", "t", "--pf-vdwr-database", "user"]);
        assert!(cli.vdw_table().is_err());
    }

    #[test]
    fn options_translate_into_analysis_config() {
        let cli = parse(&[
            "--trajectory",
            "t",
            "--pf-init-probe-pos",
            "1.0",
            "2.0",
            "3.0",
            "--pf-cutoff",
            "1.5",
            "--de-method",
            "histogram",
        ]);
        let options = cli.analysis_options().unwrap();
        assert_eq!(options.init_probe_pos, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(options.cutoff, Some(1.5));
        assert_eq!(options.density.method, DensityMethod::Histogram);
    }

    #[test]
    fn invalid_resolution_is_a_config_error() {
        let cli = parse(&["--trajectory", "t", "--de-res", "-0.5"]);
        let err = cli.analysis_options().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
