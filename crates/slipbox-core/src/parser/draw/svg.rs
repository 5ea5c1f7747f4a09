// SPDX-License-Identifier: AGPL-3.0-or-later
//! SVG rendering of a canvas
//!
//! Every cell is classified by its character and its neighbours. Line
//! characters only count as drawing when they connect to something;
//! everything else is collected into text runs.

use super::canvas::{Canvas, DrawError};
use super::DrawOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Dir {
    const ALL: [Dir; 8] = [
        Dir::N,
        Dir::NE,
        Dir::E,
        Dir::SE,
        Dir::S,
        Dir::SW,
        Dir::W,
        Dir::NW,
    ];

    fn offset(self) -> (isize, isize) {
        match self {
            Dir::N => (0, -1),
            Dir::NE => (1, -1),
            Dir::E => (1, 0),
            Dir::SE => (1, 1),
            Dir::S => (0, 1),
            Dir::SW => (-1, 1),
            Dir::W => (-1, 0),
            Dir::NW => (-1, -1),
        }
    }

    fn opposite(self) -> Dir {
        match self {
            Dir::N => Dir::S,
            Dir::NE => Dir::SW,
            Dir::E => Dir::W,
            Dir::SE => Dir::NW,
            Dir::S => Dir::N,
            Dir::SW => Dir::NE,
            Dir::W => Dir::E,
            Dir::NW => Dir::SE,
        }
    }

    /// Neighbour characters that connect back to a junction or corner
    fn partners(self) -> &'static [&'static str] {
        match self {
            Dir::E => &["-", "=", "+", ".", "'", ">"],
            Dir::W => &["-", "=", "+", ".", "'", "<"],
            Dir::N => &["|", "+", ".", "^"],
            Dir::S => &["|", "+", "'", "v"],
            Dir::NE | Dir::SW => &["/", "+"],
            Dir::NW | Dir::SE => &["\\", "+"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Blank,
    Text,
    Horizontal,
    Double,
    Vertical,
    Slash,
    Backslash,
    Junction,
    Corner,
    Arrow(Dir),
    Dot,
    Circle,
}

const HORIZONTAL_PARTNERS: &[&str] = &["-", "=", "+", ".", "'", "<", ">", "*"];
const VERTICAL_PARTNERS: &[&str] = &["|", "+", ".", "'", "^", "v", "*"];
const DIAGONAL_PARTNERS: &[&str] = &["+", ".", "'", "*", "|", "-"];
const LINES: &[&str] = &["-", "=", "|", "/", "\\", "+"];
const CORNER_BELOW: &[Dir] = &[Dir::W, Dir::E, Dir::SW, Dir::S, Dir::SE];
const CORNER_ABOVE: &[Dir] = &[Dir::W, Dir::E, Dir::NW, Dir::N, Dir::NE];

fn near<'a>(canvas: &Canvas<'a>, x: isize, y: isize, dir: Dir) -> &'a str {
    let (dx, dy) = dir.offset();
    canvas.at(x + dx, y + dy)
}

fn any_near(canvas: &Canvas<'_>, x: isize, y: isize, dirs: &[Dir], set: &[&str]) -> bool {
    dirs.iter().any(|&dir| set.contains(&near(canvas, x, y, dir)))
}

fn connections(canvas: &Canvas<'_>, x: isize, y: isize, dirs: &[Dir]) -> Vec<Dir> {
    dirs.iter()
        .copied()
        .filter(|&dir| dir.partners().contains(&near(canvas, x, y, dir)))
        .collect()
}

fn is_word(cell: &str) -> bool {
    cell.chars().any(char::is_alphanumeric)
}

fn classify(canvas: &Canvas<'_>, x: isize, y: isize) -> Glyph {
    let diagonal = |dirs: &[Dir], own: &str| {
        dirs.iter().any(|&dir| {
            let cell = near(canvas, x, y, dir);
            cell == own || DIAGONAL_PARTNERS.contains(&cell)
        })
    };
    match canvas.at(x, y) {
        " " => Glyph::Blank,
        "-" if any_near(canvas, x, y, &[Dir::W, Dir::E], HORIZONTAL_PARTNERS) => Glyph::Horizontal,
        "=" if any_near(canvas, x, y, &[Dir::W, Dir::E], HORIZONTAL_PARTNERS) => Glyph::Double,
        "|" if any_near(canvas, x, y, &[Dir::N, Dir::S], VERTICAL_PARTNERS) => Glyph::Vertical,
        "/" if diagonal(&[Dir::NE, Dir::SW], "/") => Glyph::Slash,
        "\\" if diagonal(&[Dir::NW, Dir::SE], "\\") => Glyph::Backslash,
        "+" if !connections(canvas, x, y, &Dir::ALL).is_empty() => Glyph::Junction,
        "." if connections(canvas, x, y, CORNER_BELOW).len() >= 2 => Glyph::Corner,
        "'" if connections(canvas, x, y, CORNER_ABOVE).len() >= 2 => Glyph::Corner,
        ">" if any_near(canvas, x, y, &[Dir::W], &["-", "=", "+"]) => Glyph::Arrow(Dir::E),
        "<" if any_near(canvas, x, y, &[Dir::E], &["-", "=", "+"]) => Glyph::Arrow(Dir::W),
        "^" if any_near(canvas, x, y, &[Dir::S], &["|", "+"]) => Glyph::Arrow(Dir::N),
        "v" if any_near(canvas, x, y, &[Dir::N], &["|", "+"]) => Glyph::Arrow(Dir::S),
        "*" if any_near(canvas, x, y, &Dir::ALL, LINES) => Glyph::Dot,
        "o" if any_near(canvas, x, y, &[Dir::N, Dir::E, Dir::S, Dir::W], &["-", "=", "|", "+"])
            && !is_word(near(canvas, x, y, Dir::W))
            && !is_word(near(canvas, x, y, Dir::E)) =>
        {
            Glyph::Circle
        }
        _ => Glyph::Text,
    }
}

type Point = (f64, f64);

struct Geometry {
    sx: f64,
    sy: f64,
}

impl Geometry {
    fn center(&self, x: usize, y: usize) -> Point {
        ((x as f64 + 0.5) * self.sx, (y as f64 + 0.5) * self.sy)
    }

    /// Midpoint of the cell's edge (or its corner) in direction `dir`
    fn edge(&self, x: usize, y: usize, dir: Dir) -> Point {
        let (cx, cy) = self.center(x, y);
        let (dx, dy) = dir.offset();
        (
            cx + dx as f64 * self.sx / 2.0,
            cy + dy as f64 * self.sy / 2.0,
        )
    }
}

/// Collected SVG fragments
#[derive(Default)]
struct Picture {
    path: String,
    shapes: String,
    texts: String,
}

impl Picture {
    fn line(&mut self, from: Point, to: Point) {
        self.path
            .push_str(&format!("M{} {}L{} {}", from.0, from.1, to.0, to.1));
    }

    fn curve(&mut self, from: Point, control: Point, to: Point) {
        self.path.push_str(&format!(
            "M{} {}Q{} {} {} {}",
            from.0, from.1, control.0, control.1, to.0, to.1
        ));
    }

    fn is_empty(&self) -> bool {
        self.path.is_empty() && self.shapes.is_empty() && self.texts.is_empty()
    }
}

pub fn render(canvas: &Canvas<'_>, options: &DrawOptions) -> Result<String, DrawError> {
    let (width, height) = (canvas.width(), canvas.height());
    let glyphs: Vec<Vec<Glyph>> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| classify(canvas, x as isize, y as isize))
                .collect()
        })
        .collect();
    let geo = Geometry {
        sx: f64::from(options.x_scale),
        sy: f64::from(options.y_scale),
    };
    let mut picture = Picture::default();

    for (y, row) in glyphs.iter().enumerate() {
        horizontal_runs(&mut picture, &geo, y, row);
        text_runs(&mut picture, &geo, canvas, y, row);
    }
    for x in 0..width {
        vertical_runs(&mut picture, &geo, x, &glyphs);
    }
    for (y, row) in glyphs.iter().enumerate() {
        for (x, glyph) in row.iter().enumerate() {
            cell(&mut picture, &geo, canvas, x, y, *glyph);
        }
    }

    if picture.is_empty() {
        return Err(DrawError::Empty);
    }

    let (w, h) = (width as f64 * geo.sx, height as f64 * geo.sy);
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-size="{}""#,
        geo.sy * 0.75
    );
    if !options.font.is_empty() {
        svg.push_str(&format!(
            r#" font-family="{}""#,
            html_escape::encode_double_quoted_attribute(&options.font)
        ));
    }
    svg.push('>');
    if !picture.path.is_empty() {
        svg.push_str(&format!(
            r#"<path d="{}" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"/>"#,
            picture.path
        ));
    }
    svg.push_str(&picture.shapes);
    svg.push_str(&picture.texts);
    svg.push_str("</svg>");
    Ok(svg)
}

fn horizontal_runs(picture: &mut Picture, geo: &Geometry, y: usize, row: &[Glyph]) {
    let mut x = 0;
    while x < row.len() {
        let glyph = row[x];
        if !matches!(glyph, Glyph::Horizontal | Glyph::Double) {
            x += 1;
            continue;
        }
        let start = x;
        while x < row.len() && row[x] == glyph {
            x += 1;
        }
        let (x0, cy) = geo.edge(start, y, Dir::W);
        let (x1, _) = geo.edge(x - 1, y, Dir::E);
        if glyph == Glyph::Double {
            let d = geo.sy / 8.0;
            picture.line((x0, cy - d), (x1, cy - d));
            picture.line((x0, cy + d), (x1, cy + d));
        } else {
            picture.line((x0, cy), (x1, cy));
        }
    }
}

fn vertical_runs(picture: &mut Picture, geo: &Geometry, x: usize, glyphs: &[Vec<Glyph>]) {
    let mut y = 0;
    while y < glyphs.len() {
        if glyphs[y][x] != Glyph::Vertical {
            y += 1;
            continue;
        }
        let start = y;
        while y < glyphs.len() && glyphs[y][x] == Glyph::Vertical {
            y += 1;
        }
        picture.line(geo.edge(x, start, Dir::N), geo.edge(x, y - 1, Dir::S));
    }
}

/// Text cells, joined across single blanks
fn text_runs(picture: &mut Picture, geo: &Geometry, canvas: &Canvas<'_>, y: usize, row: &[Glyph]) {
    let mut x = 0;
    while x < row.len() {
        if row[x] != Glyph::Text {
            x += 1;
            continue;
        }
        let start = x;
        while x < row.len()
            && (row[x] == Glyph::Text
                || (row[x] == Glyph::Blank && row.get(x + 1) == Some(&Glyph::Text)))
        {
            x += 1;
        }
        let text: String = (start..x)
            .map(|i| canvas.at(i as isize, y as isize))
            .collect();
        let (left, cy) = geo.edge(start, y, Dir::W);
        picture.texts.push_str(&format!(
            r#"<text x="{left}" y="{cy}" dominant-baseline="middle" xml:space="preserve">{}</text>"#,
            html_escape::encode_text(&text)
        ));
    }
}

fn cell(picture: &mut Picture, geo: &Geometry, canvas: &Canvas<'_>, x: usize, y: usize, glyph: Glyph) {
    let (ix, iy) = (x as isize, y as isize);
    let center = geo.center(x, y);
    match glyph {
        Glyph::Slash => picture.line(geo.edge(x, y, Dir::SW), geo.edge(x, y, Dir::NE)),
        Glyph::Backslash => picture.line(geo.edge(x, y, Dir::NW), geo.edge(x, y, Dir::SE)),
        Glyph::Junction => {
            for dir in connections(canvas, ix, iy, &Dir::ALL) {
                picture.line(center, geo.edge(x, y, dir));
            }
        }
        Glyph::Corner => {
            let dirs = if canvas.at(ix, iy) == "." {
                CORNER_BELOW
            } else {
                CORNER_ABOVE
            };
            if let [from, to, ..] = connections(canvas, ix, iy, dirs)[..] {
                picture.curve(geo.edge(x, y, from), center, geo.edge(x, y, to));
            }
        }
        Glyph::Arrow(dir) => {
            picture.line(geo.edge(x, y, dir.opposite()), center);
            let (dx, dy) = dir.offset();
            let half = geo.sx.min(geo.sy) / 3.0;
            let (px, py) = (-(dy as f64) * half, dx as f64 * half);
            let tip = geo.edge(x, y, dir);
            picture.shapes.push_str(&format!(
                r#"<polygon points="{},{} {},{} {},{}" fill="currentColor"/>"#,
                tip.0,
                tip.1,
                center.0 + px,
                center.1 + py,
                center.0 - px,
                center.1 - py
            ));
        }
        Glyph::Dot | Glyph::Circle => {
            let fill = if glyph == Glyph::Dot {
                "currentColor"
            } else {
                "none"
            };
            picture.shapes.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}" stroke="currentColor"/>"#,
                center.0,
                center.1,
                geo.sx.min(geo.sy) / 4.0
            ));
        }
        Glyph::Blank | Glyph::Text | Glyph::Horizontal | Glyph::Double | Glyph::Vertical => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(text: &str) -> Vec<Vec<Glyph>> {
        let canvas = Canvas::parse(text).unwrap();
        (0..canvas.height())
            .map(|y| {
                (0..canvas.width())
                    .map(|x| classify(&canvas, x as isize, y as isize))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_box_glyphs() {
        let g = glyphs("+--+\n|  |\n+--+");
        assert_eq!(g[0][0], Glyph::Junction);
        assert_eq!(g[0][1], Glyph::Horizontal);
        assert_eq!(g[1][0], Glyph::Vertical);
        assert_eq!(g[1][1], Glyph::Blank);
    }

    #[test]
    fn test_words_stay_text() {
        let g = glyphs("well-known and/or foo.");
        assert!(g[0].iter().all(|&glyph| matches!(glyph, Glyph::Text | Glyph::Blank)));
    }

    #[test]
    fn test_arrows_corners_points() {
        let g = glyphs(".-->\n|\n'-*");
        assert_eq!(g[0][0], Glyph::Corner);
        assert_eq!(g[0][3], Glyph::Arrow(Dir::E));
        assert_eq!(g[2][0], Glyph::Corner);
        assert_eq!(g[2][2], Glyph::Dot);
    }

    #[test]
    fn test_render_output() {
        let canvas = Canvas::parse("+-> a & b").unwrap();
        let options = DrawOptions {
            font: "mono \"x\"".into(),
            ..DrawOptions::default()
        };
        let svg = render(&canvas, &options).unwrap();
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="90" height="20""#));
        assert!(svg.contains(r#"font-family="mono &quot;x&quot;""#));
        assert!(svg.contains("<path d=\"M10 10L20 10"));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains(">a &amp; b</text>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_empty_is_error() {
        let canvas = Canvas::parse("  \n ").unwrap();
        assert_eq!(render(&canvas, &DrawOptions::default()), Err(DrawError::Empty));
    }
}
