//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod ensure;
pub mod free;
pub mod serve;

use portreclaim_core::TerminationReport;

/// Print a termination report as plain text.
pub(crate) fn print_report(report: &TerminationReport) {
    for pid in &report.terminated {
        println!("  killed          {}", pid);
    }
    for pid in &report.already_exited {
        println!("  already exited  {}", pid);
    }
    for (pid, reason) in &report.failed {
        println!("  failed          {} ({})", pid, reason);
    }
}
