//! List output formatting
//!
//! Rows go to stdout, one release per line.

use std::collections::BTreeSet;

use crossterm::style::Stylize;

use super::theme::{Theme, format_size};
use kvm_schema::{ActivePointer, CacheEntry, KubeVersion, ReleaseDescriptor};

fn pad(text: &str, width: usize) -> String {
    format!("{text: <width$}")
}

/// Print one row per cached release, marking the active one.
pub fn print_installed(theme: &Theme, entries: &[CacheEntry], active: Option<&ActivePointer>) {
    for entry in entries {
        let is_active =
            active.is_some_and(|a| a.version == entry.version && a.platform == entry.platform);
        let marker = if is_active {
            theme.icons.active.with(theme.colors.success)
        } else {
            theme.icons.pending.with(theme.colors.secondary)
        };

        println!(
            "{} {} {} {} {}",
            marker,
            pad(&entry.version.to_string(), theme.layout.version_width).with(theme.colors.version),
            pad(&entry.platform.to_string(), theme.layout.platform_width)
                .with(theme.colors.platform),
            format!(
                "{: >width$}",
                format_size(entry.size),
                width = theme.layout.size_width
            )
            .with(theme.colors.secondary),
            entry
                .downloaded_at
                .format("%Y-%m-%d")
                .to_string()
                .with(theme.colors.secondary)
        );
    }
}

/// Print catalog releases, newest first, tagging cached ones.
pub fn print_remote(
    theme: &Theme,
    releases: &[&ReleaseDescriptor],
    installed: &BTreeSet<KubeVersion>,
) {
    for release in releases {
        let published = release
            .published_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let mut tags = Vec::new();
        if installed.contains(&release.version) {
            tags.push("installed");
        }
        if release.prerelease || release.version.is_prerelease() {
            tags.push("pre-release");
        }

        println!(
            "{} {} {}",
            pad(&release.version.to_string(), theme.layout.version_width)
                .with(theme.colors.version),
            pad(&published, 10).with(theme.colors.secondary),
            tags.join(", ").with(theme.colors.success)
        );
    }
}

/// Print a dim summary line.
pub fn print_footer(count: usize, noun: &str) {
    let plural = if count == 1 { "" } else { "s" };
    println!();
    println!("{}", format!("{count} {noun}{plural}").dark_grey());
}
