//! ASCII plotting for terminal output.
//!
//! Fixed-size grid, deterministic output. Plot elements:
//! - yearly values: `o`
//! - connecting line: `-`

/// Render a yearly series (e.g. the global average score) as an ASCII chart.
///
/// Returns a one-line notice when there is nothing to draw.
pub fn render_year_chart(points: &[(i32, f64)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let finite: Vec<(f64, f64)> = points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|&(y, v)| (y as f64, v))
        .collect();
    if finite.is_empty() {
        return "Plot: no data\n".to_string();
    }

    let (x_min, x_max) = x_range(&finite);
    let (v_min, v_max) = value_range(&finite);
    let (v_min, v_max) = pad_range(v_min, v_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so the markers overlay it.
    let mut prev = None;
    for &(x, v) in &finite {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(v, v_min, v_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cx, cy, '-');
        }
        prev = Some((cx, cy));
    }
    for &(x, v) in &finite {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(v, v_min, v_max, height);
        grid[cy][cx] = 'o';
    }

    let years = points.iter().filter(|(_, v)| v.is_finite()).map(|p| p.0);
    let first_year = years.clone().min().unwrap_or_default();
    let last_year = years.max().unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: years=[{first_year}, {last_year}] | score=[{v_min:.2}, {v_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn x_range(points: &[(f64, f64)]) -> (f64, f64) {
    let min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if max > min { (min, max) } else { (min - 0.5, min + 0.5) }
}

fn value_range(points: &[(f64, f64)]) -> (f64, f64) {
    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // max value -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
