//! Layout map
//!
//! Human-readable listing of every closed routine: its high-water mark,
//! dependencies and local offsets.

use crate::config::{Offset, ScratchRegion};
use crate::engine::RoutineLayout;
use crate::engine::exports::format_hex;

pub fn render_map(layouts: &[RoutineLayout], region: &ScratchRegion) -> String {
    let mut out = format!(
        "; scratch region {}-{} ({} bytes)\n",
        format_hex(region.base),
        format_hex(Offset::try_from(region.limit().saturating_sub(1)).unwrap_or(Offset::MAX)),
        region.capacity
    );

    for layout in layouts {
        let used = layout.size.saturating_sub(region.base);
        out.push('\n');
        out.push_str(&format!(
            "{}: high water {} ({} bytes)\n",
            layout.name,
            format_hex(layout.size),
            used
        ));
        if !layout.dependencies.is_empty() {
            out.push_str(&format!("  uses {}\n", layout.dependencies.join(", ")));
        }
        for local in &layout.locals {
            out.push_str(&format!(
                "  {}  {:<16} {}\n",
                format_hex(local.offset),
                local.name,
                local.width
            ));
        }
    }

    let peak = layouts.iter().map(|l| l.size.saturating_sub(region.base)).max().unwrap_or(0);
    out.push_str(&format!("\n; peak usage {} of {} bytes\n", peak, region.capacity));
    out
}
