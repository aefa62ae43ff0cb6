/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of `Cell`)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed, batched with
///      `queue!` and flushed once
///   4. Swap front/back
///
/// Two things get drawn. While fireworks are visible the whole screen is
/// the fireworks surface, two surface pixels per cell using `▀` (top pixel
/// as foreground, bottom pixel as background). Otherwise the visible page
/// is laid out in a centered card box, with its buttons at the bottom and
/// a key hint on the last row.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::breakdown::TimeLeft;
use crate::domain::color::Rgb;
use crate::domain::content::{Body, PageContent};
use crate::sim::surface::Surface;
use super::text::{self, char_width, display_width};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    bold: bool,
    wide: bool,    // occupies 2 terminal columns
    cont: bool,    // right half of a wide char (never printed)
}

impl Cell {
    /// Explicit background for every empty cell. Using the same RGB for
    /// `Clear` and for cell backgrounds keeps VTE terminals from showing
    /// lines between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
        bold: false,
        wide: false,
        cont: false,
    };

    /// Sentinel that differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
        bold: false,
        wide: false,
        cont: false,
    };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg, ..Cell::BLANK }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, bg: Color) {
        for cx in x..x + w {
            self.set(cx, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Write a string at (x, y), clipped at `limit` columns from x.
    /// Wide chars take two cells; zero-width chars are dropped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, style: Style, limit: usize) {
        let end = (x + limit).min(self.width);
        let mut cx = x;
        for ch in s.chars() {
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if cx + w > end {
                break;
            }
            let cell = Cell { bold: style.bold, ..Cell::new(ch, style.fg, style.bg) };
            if w == 2 {
                self.set(cx, y, Cell { wide: true, ..cell });
                self.set(cx + 1, y, Cell { cont: true, ch: ' ', ..cell });
            } else {
                self.set(cx, y, cell);
            }
            cx += w;
        }
    }

    /// Row text with continuation cells skipped. Test helper.
    #[cfg(test)]
    fn row(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.ch)
            .collect()
    }
}

#[derive(Clone, Copy)]
struct Style {
    fg: Color,
    bg: Color,
    bold: bool,
}

impl Style {
    const fn new(fg: Color, bg: Color) -> Self {
        Style { fg, bg, bold: false }
    }

    const fn bold(self) -> Self {
        Style { bold: true, ..self }
    }
}

// ── Palette ──

const CARD_BG: Color = Color::Rgb { r: 44, g: 24, b: 52 };
const PINK: Color = Color::Rgb { r: 255, g: 105, b: 180 };
const GOLD: Color = Color::Rgb { r: 255, g: 215, b: 90 };
const SOFT: Color = Color::Rgb { r: 230, g: 210, b: 225 };
const DIM: Color = Color::Rgb { r: 120, g: 100, b: 130 };
const BUTTON_BG: Color = Color::Rgb { r: 80, g: 40, b: 90 };

const MAX_CARD_W: usize = 64;
const BUTTON_GAP: usize = 2;
const TIMER_COL_W: usize = 10;

// ── Frame description ──

/// Everything the renderer needs for one frame.
pub struct Frame<'a> {
    pub content: &'a PageContent,
    pub focus: Option<usize>,
    /// `Some` while fireworks are visible; covers the page.
    pub fireworks: Option<&'a Surface>,
    /// The Happy New Year message (gold styling).
    pub overlay: bool,
}

/// Screen area of one button, for mouse hit-testing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Hit {
    row: usize,
    x0: usize,
    x1: usize,
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    hits: Vec<Hit>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            hits: Vec::new(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            SetAttribute(Attribute::Reset),
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    /// Index of the button drawn under (col, row) in the last frame.
    pub fn button_at(&self, col: u16, row: u16) -> Option<usize> {
        hit_test(&self.hits, col as usize, row as usize)
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.hits = compose(&mut self.front, frame);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut last_bold = false;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(
            self.writer,
            SetAttribute(Attribute::NormalIntensity),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.bold != last_bold {
                    let attr = if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.writer, SetAttribute(attr))?;
                    last_bold = cell.bold;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

fn hit_test(hits: &[Hit], col: usize, row: usize) -> Option<usize> {
    hits.iter().position(|h| h.row == row && (h.x0..h.x1).contains(&col))
}

// ── Compose: build front buffer content ──

/// Draw `frame` into `buf`; returns the button hit areas (empty while
/// fireworks cover the screen).
fn compose(buf: &mut FrameBuffer, frame: &Frame) -> Vec<Hit> {
    buf.clear();
    match frame.fireworks {
        Some(surface) => {
            compose_fireworks(buf, surface);
            Vec::new()
        }
        None => compose_card(buf, frame),
    }
}

fn rgb(c: Rgb) -> Color {
    let (r, g, b) = c.to_u8();
    Color::Rgb { r, g, b }
}

fn compose_fireworks(buf: &mut FrameBuffer, surface: &Surface) {
    for y in 0..buf.height {
        for x in 0..buf.width {
            let top = surface.get(x, y * 2);
            let bottom = surface.get(x, y * 2 + 1);
            buf.set(x, y, Cell::new('▀', rgb(top), rgb(bottom)));
        }
    }
}

struct Line {
    text: String,
    style: Style,
}

fn compose_card(buf: &mut FrameBuffer, frame: &Frame) -> Vec<Hit> {
    let content = frame.content;
    let accent = if frame.overlay { GOLD } else { PINK };

    let box_w = buf.width.min(MAX_CARD_W);
    if box_w < 8 || buf.height < 4 {
        return Vec::new();
    }
    let inner_w = box_w - 4;

    let lines = card_lines(content, accent, inner_w);
    let labels: Vec<String> = button_labels(content);
    let widths: Vec<usize> = labels.iter().map(|l| display_width(l).min(inner_w)).collect();
    let rows = layout_buttons(&widths, inner_w);

    // Border + padding above and below, one blank line before the buttons.
    let gap = usize::from(!rows.is_empty());
    let box_h = lines.len() + gap + rows.len() + 4;
    let avail_h = buf.height - 1; // last row is the key hint
    let box_x = (buf.width - box_w) / 2;
    let box_y = avail_h.saturating_sub(box_h) / 2;
    let box_h = box_h.min(avail_h);

    draw_box(buf, box_x, box_y, box_w, box_h, accent);

    let inner_x = box_x + 2;
    let bottom = box_y + box_h - 2; // last usable interior row
    let mut y = box_y + 2;

    for line in &lines {
        if y > bottom {
            break;
        }
        let w = display_width(&line.text).min(inner_w);
        buf.put_str(inner_x + (inner_w - w) / 2, y, &line.text, line.style, inner_w);
        y += 1;
    }
    y += gap;

    let mut hits = vec![Hit { row: usize::MAX, x0: 0, x1: 0 }; labels.len()];
    for row in &rows {
        if y > bottom {
            break;
        }
        let total: usize = row.iter().map(|&i| widths[i]).sum::<usize>()
            + BUTTON_GAP * row.len().saturating_sub(1);
        let mut x = inner_x + inner_w.saturating_sub(total) / 2;
        for &i in row {
            let style = if frame.focus == Some(i) {
                Style::new(Color::Black, accent).bold()
            } else {
                Style::new(Color::White, BUTTON_BG)
            };
            buf.fill(x, y, widths[i], style.bg);
            buf.put_str(x, y, &labels[i], style, widths[i]);
            hits[i] = Hit { row: y, x0: x, x1: x + widths[i] };
            x += widths[i] + BUTTON_GAP;
        }
        y += 1;
    }

    let hint = key_hint(content);
    buf.put_str(1, buf.height - 1, &hint, Style::new(DIM, Cell::BASE_BG), buf.width.saturating_sub(2));

    hits
}

fn draw_box(buf: &mut FrameBuffer, x: usize, y: usize, w: usize, h: usize, accent: Color) {
    let border = Style::new(accent, CARD_BG);
    for row in y..y + h {
        buf.fill(x, row, w, CARD_BG);
    }
    let horiz = "─".repeat(w - 2);
    buf.put_str(x, y, &format!("╭{horiz}╮"), border, w);
    buf.put_str(x, y + h - 1, &format!("╰{horiz}╯"), border, w);
    for row in y + 1..y + h - 1 {
        buf.put_str(x, row, "│", border, 1);
        buf.put_str(x + w - 1, row, "│", border, 1);
    }
}

/// Title, subtitle, body and caption as centered lines.
fn card_lines(content: &PageContent, accent: Color, inner_w: usize) -> Vec<Line> {
    let text_style = Style::new(SOFT, CARD_BG);
    let mut lines = vec![Line { text: content.title.to_string(), style: Style::new(accent, CARD_BG).bold() }];

    if let Some(sub) = content.subtitle {
        lines.push(Line { text: sub.to_string(), style: text_style });
    }

    match &content.body {
        Body::Text(paragraphs) => {
            for p in paragraphs {
                lines.push(Line { text: String::new(), style: text_style });
                lines.extend(text::wrap(p, inner_w).into_iter().map(|text| Line { text, style: text_style }));
            }
        }
        Body::Timer(left) => {
            lines.push(Line { text: String::new(), style: text_style });
            let (numbers, labels) = timer_lines(*left, inner_w);
            lines.push(Line { text: numbers, style: Style::new(Color::White, CARD_BG).bold() });
            lines.push(Line { text: labels, style: Style::new(DIM, CARD_BG) });
        }
        // Tiles are drawn inside their buttons.
        Body::Tiles(_) => {}
    }

    if let Some(caption) = content.caption {
        lines.push(Line { text: String::new(), style: text_style });
        lines.push(Line { text: caption.to_string(), style: Style::new(accent, CARD_BG) });
    }
    lines
}

/// Four-column countdown: numbers and their unit labels.
fn timer_lines(left: Option<TimeLeft>, inner_w: usize) -> (String, String) {
    let col_w = (inner_w / 4).min(TIMER_COL_W).max(4);
    let values = match left {
        Some(t) => [t.days, t.hours, t.minutes, t.seconds].map(|v| format!("{v:02}")),
        None => ["--".to_string(), "--".to_string(), "--".to_string(), "--".to_string()],
    };
    let labels = if col_w >= 9 { ["Days", "Hours", "Minutes", "Seconds"] } else { ["D", "H", "M", "S"] };

    let numbers = values.iter().map(|v| format!("{v:^col_w$}")).collect::<String>();
    let units = labels.iter().map(|l| format!("{l:^col_w$}")).collect::<String>();
    (numbers.trim_end().to_string(), units.trim_end().to_string())
}

fn button_labels(content: &PageContent) -> Vec<String> {
    let tiles: &[&str] = match &content.body {
        Body::Tiles(t) => t,
        _ => &[],
    };
    content
        .buttons
        .iter()
        .enumerate()
        .map(|(i, b)| match tiles.get(i) {
            Some(tile) => format!(" {tile} {} ", b.label),
            None => format!(" {} ", b.label),
        })
        .collect()
}

/// Pack buttons left to right into rows no wider than `max_w`.
fn layout_buttons(widths: &[usize], max_w: usize) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut used = 0;
    for (i, &w) in widths.iter().enumerate() {
        match rows.last_mut() {
            Some(row) if used + BUTTON_GAP + w <= max_w => {
                row.push(i);
                used += BUTTON_GAP + w;
            }
            _ => {
                rows.push(vec![i]);
                used = w;
            }
        }
    }
    rows
}

fn key_hint(content: &PageContent) -> String {
    if content.buttons.is_empty() {
        return "q quit".to_string();
    }
    let keys: Vec<String> = content.buttons.iter().map(|b| b.hotkey.to_string()).collect();
    format!("←/→ move · Enter select · keys {} · q quit", keys.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::{self, new_year_overlay};
    use crate::domain::page::Page;

    fn frame_for(content: &PageContent, focus: Option<usize>) -> Frame<'_> {
        Frame { content, focus, fireworks: None, overlay: false }
    }

    fn screen(buf: &FrameBuffer) -> String {
        (0..buf.height).map(|y| buf.row(y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut buf = FrameBuffer::new(6, 1);
        let s = Style::new(Color::White, Cell::BASE_BG);
        buf.put_str(0, 0, "a🎉b", s, 6);
        assert!(buf.get(1, 0).wide);
        assert!(buf.get(2, 0).cont);
        assert_eq!(buf.get(3, 0).ch, 'b');
        // A wide char that would straddle the clip edge is dropped.
        let mut buf = FrameBuffer::new(6, 1);
        buf.put_str(0, 0, "abcde🎉", s, 6);
        assert_eq!(buf.row(0), "abcde ");
    }

    #[test]
    fn countdown_page_shows_the_breakdown() {
        let t = TimeLeft { days: 3, hours: 4, minutes: 5, seconds: 6 };
        let c = content::render(Page::Countdown, Some(t));
        let mut buf = FrameBuffer::new(80, 24);
        let hits = compose(&mut buf, &frame_for(&c, None));
        let text = screen(&buf);
        assert!(text.contains("Open when it's"));
        assert!(text.contains("Minutes"));
        let numbers = text.lines().find(|l| l.contains("03")).unwrap();
        for v in ["03", "04", "05", "06"] {
            assert!(numbers.contains(v), "{numbers}");
        }
        assert!(hits.is_empty());
    }

    #[test]
    fn buttons_are_hit_testable() {
        let c = content::render(Page::Intro, None);
        let mut buf = FrameBuffer::new(80, 24);
        let hits = compose(&mut buf, &frame_for(&c, Some(1)));
        assert_eq!(hits.len(), 2);
        let yes = hits[0];
        let no = hits[1];
        assert_eq!(yes.row, no.row);
        assert!(yes.x1 <= no.x0);
        assert_eq!(hit_test(&hits, yes.x0, yes.row), Some(0));
        assert_eq!(hit_test(&hits, no.x1 - 1, no.row), Some(1));
        assert_eq!(hit_test(&hits, no.x1, no.row), None);
        assert_eq!(hit_test(&hits, yes.x0, yes.row + 1), None);
        // Focused button is drawn in the accent color.
        assert_eq!(buf.get(no.x0, no.row).bg, PINK);
        assert_eq!(buf.get(yes.x0, yes.row).bg, BUTTON_BG);
    }

    #[test]
    fn gift_buttons_wrap_on_narrow_terminals() {
        let c = content::render(Page::Gifts, None);
        let mut buf = FrameBuffer::new(40, 24);
        let hits = compose(&mut buf, &frame_for(&c, Some(0)));
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.row != usize::MAX && h.x1 <= 40));
        assert!(hits[3].row > hits[0].row);
        assert!(screen(&buf).contains("Letter"));
    }

    #[test]
    fn fireworks_cover_the_card() {
        let mut surface = Surface::new(4, 4);
        surface.fill_circle(0.5, 0.5, 0.5, Rgb::new(255.0, 0.0, 0.0));
        let c = content::render(Page::NewYear, None);
        let mut buf = FrameBuffer::new(4, 2);
        let hits = compose(&mut buf, &Frame { content: &c, focus: Some(0), fireworks: Some(&surface), overlay: false });
        assert!(hits.is_empty());
        let cell = buf.get(0, 0);
        assert_eq!(cell.ch, '▀');
        assert_eq!(cell.fg, Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(cell.bg, Color::Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(buf.row(1), "▀▀▀▀");
    }

    #[test]
    fn overlay_uses_the_gold_frame() {
        let c = new_year_overlay();
        let mut buf = FrameBuffer::new(80, 24);
        let hits = compose(&mut buf, &Frame { content: &c, focus: Some(0), fireworks: None, overlay: true });
        assert_eq!(hits.len(), 1);
        assert_eq!(buf.get(hits[0].x0, hits[0].row).bg, GOLD);
        assert!(screen(&buf).contains("Happy New Year"));
    }

    #[test]
    fn tiny_terminals_draw_nothing() {
        let c = content::render(Page::Intro, None);
        let mut buf = FrameBuffer::new(5, 2);
        assert!(compose(&mut buf, &frame_for(&c, None)).is_empty());
    }

    #[test]
    fn button_rows_respect_width() {
        assert_eq!(layout_buttons(&[5, 5, 5], 12), vec![vec![0, 1], vec![2]]);
        assert_eq!(layout_buttons(&[20], 10), vec![vec![0]]);
        assert!(layout_buttons(&[], 10).is_empty());
    }

    #[test]
    fn timer_without_a_tick_shows_dashes() {
        let (numbers, labels) = timer_lines(None, 60);
        assert_eq!(numbers.matches("--").count(), 4);
        assert!(labels.starts_with("   Days"));
        let (_, short) = timer_lines(None, 20);
        assert!(short.contains('D') && !short.contains("Days"));
    }
}
