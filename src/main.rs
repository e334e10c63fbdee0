use std::str::FromStr;

use clap::Parser;
use zpool_perf_planner::{Comparison, DriveSpec, PoolConfig};

/// Command-line arguments for the ZFS Pool Performance Planner.
#[derive(Debug, Parser)]
struct Args {
    /// Sequential read speed of one drive, in MB/s.
    #[arg(long)]
    read_speed: f64,

    /// Sequential write speed of one drive, in MB/s.
    #[arg(long)]
    write_speed: f64,

    /// Random read IOPS of one drive.
    #[arg(long)]
    read_iops: f64,

    /// Random write IOPS of one drive.
    #[arg(long)]
    write_iops: f64,

    /// Pool layout to evaluate, as `NAME:DRIVES:PARITY:VDEVS` (drives and
    /// parity counted per vdev). Repeat the flag to compare several layouts;
    /// the table keeps the order given here.
    #[arg(long = "pool", required = true, value_name = "NAME:DRIVES:PARITY:VDEVS")]
    pools: Vec<PoolArg>,
}

/// One `--pool` occurrence, parsed but not yet validated as a topology.
#[derive(Debug, Clone)]
struct PoolArg {
    name: String,
    drives_per_vdev: u32,
    parity_per_vdev: u32,
    total_vdevs: u32,
}

impl FromStr for PoolArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(name), Some(drives), Some(parity), Some(vdevs), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(format!("expected NAME:DRIVES:PARITY:VDEVS, got '{s}'"));
        };
        let field = |what: &str, v: &str| {
            v.parse::<u32>()
                .map_err(|_| format!("{what} must be a non-negative integer, got '{v}'"))
        };
        Ok(PoolArg {
            name: name.to_string(),
            drives_per_vdev: field("drives per vdev", drives)?,
            parity_per_vdev: field("parity per vdev", parity)?,
            total_vdevs: field("total vdevs", vdevs)?,
        })
    }
}

fn main() {
    let a = Args::parse();

    let drive = match DriveSpec::new(a.read_speed, a.write_speed, a.read_iops, a.write_iops) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    // First invalid layout aborts the whole run, before any derivation.
    let mut pools = Vec::with_capacity(a.pools.len());
    for p in a.pools {
        match PoolConfig::new(p.name, p.drives_per_vdev, p.parity_per_vdev, p.total_vdevs, drive) {
            Ok(pool) => pools.push(pool),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            }
        }
    }

    println!("{}", Comparison::run(&pools));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pool_arg() {
        let p: PoolArg = "tank:6:2:3".parse().unwrap();
        assert_eq!(p.name, "tank");
        assert_eq!(p.drives_per_vdev, 6);
        assert_eq!(p.parity_per_vdev, 2);
        assert_eq!(p.total_vdevs, 3);
    }

    #[test]
    fn rejects_malformed_pool_arg() {
        assert!("tank:6:2".parse::<PoolArg>().is_err());
        assert!("tank:6:2:3:9".parse::<PoolArg>().is_err());
        assert!("tank:six:2:3".parse::<PoolArg>().is_err());
        assert!("tank:6:-1:3".parse::<PoolArg>().is_err());
    }
}
