//! Gantt chart output: an SVG file for viewing and a plain-text timeline for the terminal.

use crate::scheduler::{Process, Ticks, Trace};
use std::{
    fmt::Write as _,
    fs, io,
    path::Path,
};
use tracing::info;

const TICK_WIDTH: u64 = 20;
const LEFT_MARGIN: u64 = 50;
const ROW_HEIGHT: u64 = 40;
const BAR_HEIGHT: u64 = 20;
const TOP_MARGIN: u64 = 30;

/// The tick at which the last process finished.
pub fn horizon(processes: &[Process]) -> Ticks {
    processes
        .iter()
        .flat_map(|process| process.slices().iter().filter_map(|slice| slice.end))
        .max()
        .unwrap_or(0)
}

/// Renders one row per process, one bar per slice, and a labelled time axis spanning
/// `0..=horizon`.
pub fn render_svg(processes: &[Process]) -> String {
    let horizon = horizon(processes);
    let axis_end = LEFT_MARGIN + horizon * TICK_WIDTH;
    let width = axis_end + LEFT_MARGIN;
    let height = ROW_HEIGHT * processes.len() as u64 + 2 * ROW_HEIGHT;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}'>"
    );
    let _ = writeln!(
        svg,
        "<style> text{{font-family:monospace;font-size:12px;}} </style>"
    );

    let mut y = TOP_MARGIN;
    for process in processes {
        let color = escape(process.color());
        for slice in process.slices() {
            let Some(end) = slice.end else { continue };
            let x = LEFT_MARGIN + slice.start * TICK_WIDTH;
            let w = (end - slice.start) * TICK_WIDTH;
            let _ = writeln!(
                svg,
                "<rect x='{x}' y='{y}' width='{w}' height='{BAR_HEIGHT}' fill='{color}' stroke='black'/>"
            );
        }
        let _ = writeln!(
            svg,
            "<text x='10' y='{}'>{}</text>",
            y + 15,
            escape(process.id())
        );
        y += ROW_HEIGHT;
    }

    let _ = writeln!(
        svg,
        "<line x1='{LEFT_MARGIN}' y1='{y}' x2='{axis_end}' y2='{y}' stroke='black'/>"
    );
    for tick in 0..=horizon {
        let x = LEFT_MARGIN + tick * TICK_WIDTH;
        let _ = writeln!(
            svg,
            "<line x1='{x}' y1='{y}' x2='{x}' y2='{}' stroke='black'/>",
            y + 5
        );
        let _ = writeln!(
            svg,
            "<text x='{}' y='{}'>{tick}</text>",
            x.saturating_sub(3),
            y + 20
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Writes the SVG chart to `path`, creating parent directories as needed.
pub fn write_svg(processes: &[Process], path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_svg(processes))?;
    info!(path = %path.display(), "gantt chart written");
    Ok(())
}

/// One line per process with `#` for each tick it held the processor, plus a ruler.
pub fn render_text(processes: &[Process], trace: &Trace) -> String {
    let horizon = trace.end();
    let label_width = processes
        .iter()
        .map(|process| process.id().len())
        .max()
        .unwrap_or(0);

    let mut text = String::new();
    for (index, process) in processes.iter().enumerate() {
        let bar: String = (0..horizon)
            .map(|tick| {
                if trace.running_at(tick) == Some(index) {
                    '#'
                } else {
                    '.'
                }
            })
            .collect();
        let _ = writeln!(text, "{:>label_width$} |{bar}|", process.id());
    }

    let ruler: String = (0..horizon)
        .map(|tick| if tick % 5 == 0 { '|' } else { ' ' })
        .collect();
    let _ = writeln!(text, "{:>label_width$}  {ruler}", "");
    let labels: String = (0..horizon)
        .step_by(5)
        .map(|tick| format!("{tick:<5}"))
        .collect();
    let _ = write!(text, "{:>label_width$}  {}", "", labels.trim_end());
    text
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Policy, Simulation};

    fn finished() -> Simulation {
        let mut simulation = Simulation::new(
            vec![
                Process::colored("A", "red", 0, 3),
                Process::colored("B", "#00ff00", 1, 2),
            ],
            Policy::from_name("FIFO", 0).unwrap(),
        )
        .unwrap();
        simulation.run();
        simulation
    }

    #[test]
    fn svg_has_one_bar_per_slice() {
        let simulation = finished();
        let svg = render_svg(simulation.processes());

        assert_eq!(svg.matches("<rect ").count(), 2);
        assert!(svg.contains("<rect x='50' y='30' width='60' height='20' fill='red'"));
        assert!(svg.contains("<rect x='110' y='70' width='40' height='20' fill='#00ff00'"));
        assert!(svg.contains(">5</text>"));
        assert!(!svg.contains(">6</text>"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut simulation = Simulation::new(
            vec![Process::new("<a&b>", 0, 1)],
            Policy::from_name("FIFO", 0).unwrap(),
        )
        .unwrap();
        simulation.run();
        assert!(render_svg(simulation.processes()).contains("&lt;a&amp;b&gt;"));
    }

    #[test]
    fn text_timeline_marks_running_ticks() {
        let simulation = finished();
        let text = render_text(simulation.processes(), simulation.trace());
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("A |###..|"));
        assert_eq!(lines.next(), Some("B |...##|"));
    }

    #[test]
    fn write_svg_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("gantt.svg");
        let simulation = finished();

        write_svg(simulation.processes(), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("<svg"));
    }

    #[test]
    fn empty_chart_still_has_axis() {
        let svg = render_svg(&[]);
        assert!(svg.contains(">0</text>"));
        assert_eq!(horizon(&[]), 0);
    }
}
