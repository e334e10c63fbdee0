#![doc = include_str!("../README.md")]

pub mod planner {
    use std::fmt::{Display, Formatter, Result as FmtResult};

    use thiserror::Error;

    /// Errors raised while constructing a [`DriveSpec`] or [`PoolConfig`].
    ///
    /// All validation happens at construction time, so every value that exists
    /// can be derived without arithmetic faults.
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum PlannerError {
        /// A drive-spec field was zero, negative, or NaN.
        #[error("{field} must be > 0, got {value}")]
        NonPositiveSpec { field: &'static str, value: f64 },

        /// The pool name was empty.
        #[error("pool name must not be empty")]
        EmptyName,

        /// `drives_per_vdev` was zero.
        #[error("pool '{name}': drives per vdev must be >= 1")]
        NoDrives { name: String },

        /// `total_vdevs` was zero.
        #[error("pool '{name}': total vdevs must be >= 1")]
        NoVdevs { name: String },

        /// Parity consumed the whole vdev, leaving no usable drive.
        #[error(
            "pool '{name}': parity drives per vdev ({parity}) must be fewer than drives per vdev ({drives})"
        )]
        ParityTooWide {
            name: String,
            parity: u32,
            drives: u32,
        },
    }

    /// Performance of a single physical drive.
    ///
    /// Speeds are in **MB/s**, IOPS in operations per second. One spec is shared
    /// by every pool layout compared in a run; the model assumes a pool is built
    /// from uniform drives.
    #[derive(Debug, Clone, Copy)]
    pub struct DriveSpec {
        read_speed: f64,
        write_speed: f64,
        read_iops: f64,
        write_iops: f64,
    }

    impl DriveSpec {
        /// Builds a drive spec from per-drive figures.
        ///
        /// # Errors
        ///
        /// Returns [`PlannerError::NonPositiveSpec`] if any field is zero,
        /// negative, or NaN.
        pub fn new(
            read_speed: f64,
            write_speed: f64,
            read_iops: f64,
            write_iops: f64,
        ) -> Result<Self, PlannerError> {
            let fields = [
                ("read speed", read_speed),
                ("write speed", write_speed),
                ("read IOPS", read_iops),
                ("write IOPS", write_iops),
            ];
            for (field, value) in fields {
                if value <= 0.0 || value.is_nan() {
                    return Err(PlannerError::NonPositiveSpec { field, value });
                }
            }
            Ok(Self {
                read_speed,
                write_speed,
                read_iops,
                write_iops,
            })
        }
    }

    /// One candidate pool layout: `total_vdevs` uniform redundancy groups, each
    /// `drives_per_vdev` wide with `parity_per_vdev` parity drives.
    ///
    /// Construction validates the topology, so every `PoolConfig` that exists
    /// satisfies `drives_per_vdev - parity_per_vdev >= 1` and
    /// [`calculate_performance`](PoolConfig::calculate_performance) cannot hit a
    /// division by zero.
    #[derive(Debug, Clone)]
    pub struct PoolConfig {
        name: String,
        drives_per_vdev: u32,
        parity_per_vdev: u32,
        total_vdevs: u32,
        drive: DriveSpec,
    }

    impl PoolConfig {
        /// Builds a pool layout over `drive`, validating the topology.
        ///
        /// # Parameters
        ///
        /// - `name` — Label echoed in the result; need not be unique.
        /// - `drives_per_vdev` — Drives in each redundancy group. Must be ≥ 1.
        /// - `parity_per_vdev` — Parity drives per group. Must be strictly less
        ///   than `drives_per_vdev`, leaving at least one usable drive.
        /// - `total_vdevs` — Number of redundancy groups in the pool. Must be ≥ 1.
        /// - `drive` — Per-drive performance figures.
        ///
        /// # Errors
        ///
        /// Returns [`PlannerError::EmptyName`], [`PlannerError::NoDrives`],
        /// [`PlannerError::NoVdevs`], or [`PlannerError::ParityTooWide`] when the
        /// corresponding bound is violated.
        pub fn new(
            name: impl Into<String>,
            drives_per_vdev: u32,
            parity_per_vdev: u32,
            total_vdevs: u32,
            drive: DriveSpec,
        ) -> Result<Self, PlannerError> {
            let name = name.into();
            if name.is_empty() {
                return Err(PlannerError::EmptyName);
            }
            if drives_per_vdev == 0 {
                return Err(PlannerError::NoDrives { name });
            }
            if total_vdevs == 0 {
                return Err(PlannerError::NoVdevs { name });
            }
            if parity_per_vdev >= drives_per_vdev {
                return Err(PlannerError::ParityTooWide {
                    name,
                    parity: parity_per_vdev,
                    drives: drives_per_vdev,
                });
            }
            Ok(Self {
                name,
                drives_per_vdev,
                parity_per_vdev,
                total_vdevs,
                drive,
            })
        }

        /// Name the layout was given at construction.
        pub fn name(&self) -> &str {
            &self.name
        }

        /// Derives the aggregate performance estimate for this layout.
        ///
        /// Pure and infallible: construction already guaranteed at least one
        /// usable drive per vdev, so no term below can divide by zero.
        ///
        /// # Formulas
        ///
        /// ```text
        /// usable_drives      = drives_per_vdev - parity_per_vdev
        /// total_read_speed   = read_speed * drives_per_vdev * total_vdevs
        /// total_write_speed  = write_speed * total_vdevs
        /// total_read_iops    = read_iops * drives_per_vdev * total_vdevs
        /// total_write_iops   = (write_iops * usable_drives * total_vdevs) / (parity_per_vdev + 1)
        /// base_resilver_time = 100 * (drives_per_vdev / usable_drives) * (1 / total_vdevs)
        /// resilver_NN_full   = base_resilver_time * {1.1, 1.5, 2.0, 3.0}
        /// ```
        ///
        /// # Examples
        ///
        /// ```
        /// use zpool_perf_planner::{DriveSpec, PoolConfig};
        ///
        /// let drive = DriveSpec::new(200.0, 150.0, 10_000.0, 8_000.0).unwrap();
        /// let perf = PoolConfig::new("mirror", 2, 1, 4, drive)
        ///     .unwrap()
        ///     .calculate_performance();
        ///
        /// assert!((perf.total_read_speed - 1600.0).abs() < 1e-9);
        /// assert!((perf.total_write_iops - 16_000.0).abs() < 1e-9);
        /// assert!((perf.base_resilver_time - 50.0).abs() < 1e-9);
        /// ```
        ///
        /// # Notes
        ///
        /// The model is deliberately coarse. Reads scale with every drive in
        /// every vdev, while writes in a parity-protected group collapse to
        /// roughly one drive's throughput per vdev. Write IOPS scale with the
        /// usable drives but are divided by `parity_per_vdev + 1` for parity
        /// write amplification. The resilver score grows with vdev width
        /// relative to usable drives and shrinks with the number of vdevs; the
        /// occupancy multipliers are fixed scale factors, not an empirical
        /// model.
        pub fn calculate_performance(&self) -> PerformanceResult {
            let drives = self.drives_per_vdev as f64;
            let parity = self.parity_per_vdev as f64;
            let vdevs = self.total_vdevs as f64;
            let usable = drives - parity;

            let total_read_speed = self.drive.read_speed * drives * vdevs;
            // Writes in a parity group run near one drive's speed per vdev.
            let total_write_speed = self.drive.write_speed * vdevs;

            let total_read_iops = self.drive.read_iops * drives * vdevs;
            let total_write_iops = (self.drive.write_iops * usable * vdevs) / (parity + 1.0);

            // Wider vdevs resilver slower; independent vdevs resilver in parallel.
            let base_resilver_time = 100.0 * (drives / usable) * (1.0 / vdevs);

            PerformanceResult {
                name: self.name.clone(),
                total_read_speed,
                total_write_speed,
                total_read_iops,
                total_write_iops,
                base_resilver_time,
                resilver_25_full: base_resilver_time * 1.1,
                resilver_50_full: base_resilver_time * 1.5,
                resilver_75_full: base_resilver_time * 2.0,
                resilver_90_full: base_resilver_time * 3.0,
            }
        }
    }

    /// Aggregate estimates for one pool layout, produced by
    /// [`PoolConfig::calculate_performance`].
    ///
    /// Throughput is in **MB/s**, IOPS in operations per second. Resilver
    /// figures are unitless scores where **lower is better**; they rank layouts
    /// against each other and do not predict wall-clock hours.
    #[derive(Debug, Clone)]
    pub struct PerformanceResult {
        /// Name of the pool this result was derived from.
        pub name: String,

        /// Formula: `read_speed * drives_per_vdev * total_vdevs`
        pub total_read_speed: f64,

        /// Formula: `write_speed * total_vdevs`
        pub total_write_speed: f64,

        /// Formula: `read_iops * drives_per_vdev * total_vdevs`
        pub total_read_iops: f64,

        /// Formula: `(write_iops * usable_drives * total_vdevs) / (parity_per_vdev + 1)`
        pub total_write_iops: f64,

        /// Resilver score for a near-empty pool.
        ///
        /// Formula: `100 * (drives_per_vdev / usable_drives) * (1 / total_vdevs)`
        pub base_resilver_time: f64,

        /// Base score × 1.1.
        pub resilver_25_full: f64,
        /// Base score × 1.5.
        pub resilver_50_full: f64,
        /// Base score × 2.0.
        pub resilver_75_full: f64,
        /// Base score × 3.0.
        pub resilver_90_full: f64,
    }

    /// Column headers of the comparison table, in output order.
    const HEADERS: [&str; 9] = [
        "Name",
        "Total Read Speed (MB/s)",
        "Total Write Speed (MB/s)",
        "Total Read IOPS",
        "Total Write IOPS",
        "Resilver Time 25% Full (lower is better)",
        "Resilver Time 50% Full (lower is better)",
        "Resilver Time 75% Full (lower is better)",
        "Resilver Time 90% Full (lower is better)",
    ];

    fn fmt_metric(x: f64) -> String {
        if x.fract() == 0.0 {
            format!("{}", x as i64)
        } else {
            format!("{:.2}", x)
        }
    }

    impl PerformanceResult {
        fn row(&self) -> [String; 9] {
            [
                self.name.clone(),
                fmt_metric(self.total_read_speed),
                fmt_metric(self.total_write_speed),
                fmt_metric(self.total_read_iops),
                fmt_metric(self.total_write_iops),
                fmt_metric(self.resilver_25_full),
                fmt_metric(self.resilver_50_full),
                fmt_metric(self.resilver_75_full),
                fmt_metric(self.resilver_90_full),
            ]
        }
    }

    /// Ordered results of comparing several pool layouts.
    ///
    /// The [`Display`] impl renders the comparison table: a header row with the
    /// metric names, then one row per layout in input order.
    #[derive(Debug, Clone)]
    pub struct Comparison {
        results: Vec<PerformanceResult>,
    }

    impl Comparison {
        /// Derives every layout's metrics, preserving input order.
        ///
        /// Each derivation is independent of the others; a comparison over N
        /// layouts is a plain order-preserving map.
        pub fn run(pools: &[PoolConfig]) -> Self {
            Self {
                results: pools.iter().map(PoolConfig::calculate_performance).collect(),
            }
        }

        /// Results in the same order the layouts were given.
        pub fn results(&self) -> &[PerformanceResult] {
            &self.results
        }
    }

    impl Display for Comparison {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            let rows: Vec<[String; 9]> = self.results.iter().map(PerformanceResult::row).collect();

            let mut widths: [usize; 9] = [0; 9];
            for (w, h) in widths.iter_mut().zip(HEADERS) {
                *w = h.len();
            }
            for row in &rows {
                for (w, cell) in widths.iter_mut().zip(row) {
                    *w = (*w).max(cell.len());
                }
            }

            writeln!(
                f,
                "================= ZFS Pool Configurations Comparison ================="
            )?;
            for (i, (h, w)) in HEADERS.iter().zip(widths).enumerate() {
                if i == 0 {
                    write!(f, "{h:<w$}")?;
                } else {
                    write!(f, "  {h:>w$}")?;
                }
            }
            writeln!(f)?;
            for row in &rows {
                for (i, (cell, w)) in row.iter().zip(widths).enumerate() {
                    if i == 0 {
                        write!(f, "{cell:<w$}")?;
                    } else {
                        write!(f, "  {cell:>w$}")?;
                    }
                }
                writeln!(f)?;
            }
            write!(
                f,
                "======================================================================"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn drive() -> DriveSpec {
        DriveSpec::new(200.0, 150.0, 10_000.0, 8_000.0).unwrap()
    }

    // Scenario: 4 mirrored pairs of 200/150 MB/s, 10k/8k IOPS drives
    #[test]
    fn mirror_numbers_match() {
        let p = PoolConfig::new("mirror", 2, 1, 4, drive())
            .unwrap()
            .calculate_performance();
        assert!((p.total_read_speed - 1600.0).abs() < 1e-9);
        assert!((p.total_write_speed - 600.0).abs() < 1e-9);
        assert!((p.total_read_iops - 80_000.0).abs() < 1e-9);
        assert!((p.total_write_iops - 16_000.0).abs() < 1e-9);
        assert!((p.base_resilver_time - 50.0).abs() < 1e-9);
        assert!((p.resilver_25_full - 55.0).abs() < 1e-9);
        assert!((p.resilver_50_full - 75.0).abs() < 1e-9);
        assert!((p.resilver_75_full - 100.0).abs() < 1e-9);
        assert!((p.resilver_90_full - 150.0).abs() < 1e-9);
    }

    // Scenario: single 6-wide RAIDZ2 vdev, usable drives = 4
    #[test]
    fn raidz2_numbers_match() {
        let p = PoolConfig::new("raidz2", 6, 2, 1, drive())
            .unwrap()
            .calculate_performance();
        assert!((p.total_read_speed - 1200.0).abs() < 1e-9);
        assert!((p.total_write_speed - 150.0).abs() < 1e-9);
        assert!((p.total_read_iops - 60_000.0).abs() < 1e-9);
        // (8000 * 4 * 1) / 3
        assert!((p.total_write_iops - 32_000.0 / 3.0).abs() < 1e-9);
        assert!((p.base_resilver_time - 150.0).abs() < 1e-9);
    }

    #[test]
    fn doubling_vdevs_doubles_throughput() {
        let three = PoolConfig::new("z1", 5, 1, 3, drive())
            .unwrap()
            .calculate_performance();
        let six = PoolConfig::new("z1", 5, 1, 6, drive())
            .unwrap()
            .calculate_performance();
        assert!((six.total_read_speed - 2.0 * three.total_read_speed).abs() < 1e-9);
        assert!((six.total_write_speed - 2.0 * three.total_write_speed).abs() < 1e-9);
        assert!((six.total_read_iops - 2.0 * three.total_read_iops).abs() < 1e-9);
    }

    #[test]
    fn resilver_multipliers_are_exact() {
        let p = PoolConfig::new("z3", 11, 3, 2, drive())
            .unwrap()
            .calculate_performance();
        assert!((p.resilver_25_full / p.base_resilver_time - 1.1).abs() < 1e-12);
        assert!((p.resilver_50_full / p.base_resilver_time - 1.5).abs() < 1e-12);
        assert!((p.resilver_75_full / p.base_resilver_time - 2.0).abs() < 1e-12);
        assert!((p.resilver_90_full / p.base_resilver_time - 3.0).abs() < 1e-12);
    }

    #[test]
    fn comparison_preserves_input_order() {
        let pools = vec![
            PoolConfig::new("wide", 12, 2, 1, drive()).unwrap(),
            PoolConfig::new("narrow", 4, 1, 3, drive()).unwrap(),
            PoolConfig::new("wide", 12, 3, 1, drive()).unwrap(),
        ];
        let cmp = Comparison::run(&pools);
        let names: Vec<&str> = cmp.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["wide", "narrow", "wide"]);
    }

    #[test]
    fn max_parity_for_width_is_valid() {
        let p = PoolConfig::new("mirror3", 3, 2, 2, drive())
            .unwrap()
            .calculate_performance();
        // usable = 1, so (8000 * 1 * 2) / 3
        assert!((p.total_write_iops - 16_000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_topology() {
        let d = drive();
        assert_eq!(
            PoolConfig::new("p", 4, 4, 1, d).unwrap_err(),
            PlannerError::ParityTooWide {
                name: "p".into(),
                parity: 4,
                drives: 4
            }
        );
        assert!(PoolConfig::new("p", 4, 5, 1, d).is_err());
        assert!(matches!(
            PoolConfig::new("p", 0, 0, 1, d),
            Err(PlannerError::NoDrives { .. })
        ));
        assert!(matches!(
            PoolConfig::new("p", 4, 1, 0, d),
            Err(PlannerError::NoVdevs { .. })
        ));
        assert!(matches!(
            PoolConfig::new("", 4, 1, 1, d),
            Err(PlannerError::EmptyName)
        ));
    }

    #[test]
    fn rejects_non_positive_drive_spec() {
        assert!(DriveSpec::new(0.0, 150.0, 10_000.0, 8_000.0).is_err());
        assert!(DriveSpec::new(200.0, -1.0, 10_000.0, 8_000.0).is_err());
        assert!(DriveSpec::new(200.0, 150.0, 10_000.0, f64::NAN).is_err());
    }

    #[test]
    fn table_lists_every_column_in_order() {
        let pools = vec![PoolConfig::new("mirror", 2, 1, 4, drive()).unwrap()];
        let table = Comparison::run(&pools).to_string();
        let header = table.lines().nth(1).unwrap();
        let mut from = 0;
        for col in [
            "Name",
            "Total Read Speed (MB/s)",
            "Total Write Speed (MB/s)",
            "Total Read IOPS",
            "Total Write IOPS",
            "Resilver Time 25% Full (lower is better)",
            "Resilver Time 50% Full (lower is better)",
            "Resilver Time 75% Full (lower is better)",
            "Resilver Time 90% Full (lower is better)",
        ] {
            let at = header[from..].find(col).expect(col);
            from += at + col.len();
        }
        assert!(table.lines().nth(2).unwrap().starts_with("mirror"));
    }
}

pub use planner::{Comparison, DriveSpec, PerformanceResult, PlannerError, PoolConfig};
