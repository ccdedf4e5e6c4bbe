use ratatui::{buffer::Buffer, layout::Size, style::Style};

/// A fixed-size grid of character cells.
///
/// `put` is the only write operation and it never fails: the part of `text`
/// that would land outside the grid is discarded and the number of columns
/// actually written is returned.
pub trait Surface {
    fn size(&self) -> Size;

    fn clear(&mut self);

    /// Write `text` at row `y`, column `x`, using at most `max_width` columns.
    fn put(&mut self, y: u16, x: u16, text: &str, max_width: u16, style: Style) -> u16;
}

impl Surface for Buffer {
    fn size(&self) -> Size {
        Size {
            width: self.area.width,
            height: self.area.height,
        }
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn put(&mut self, y: u16, x: u16, text: &str, max_width: u16, style: Style) -> u16 {
        let area = self.area;
        if y >= area.height || x >= area.width {
            return 0;
        }
        let room = (area.width - x).min(max_width);
        if room == 0 || text.is_empty() {
            return 0;
        }
        let start = area.x + x;
        let (end, _) = self.set_stringn(start, area.y + y, text, room as usize, style);
        end.saturating_sub(start)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Read one row of a rendered buffer back as a string.
    pub fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.get(x, y).symbol())
            .collect::<String>()
    }

    /// All rows of a rendered buffer, right-trimmed.
    pub fn rows(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| row_text(buf, y).trim_end().to_string())
            .collect()
    }

    /// Surface double that records every write and how many were clipped.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub width: u16,
        pub height: u16,
        pub writes: Vec<(u16, u16, String)>,
        pub clipped: usize,
    }

    impl RecordingSurface {
        pub fn new(width: u16, height: u16) -> Self {
            Self {
                width,
                height,
                ..Self::default()
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> Size {
            Size {
                width: self.width,
                height: self.height,
            }
        }

        fn clear(&mut self) {
            self.writes.clear();
        }

        fn put(&mut self, y: u16, x: u16, text: &str, max_width: u16, _style: Style) -> u16 {
            let len = text.chars().count() as u16;
            if y >= self.height || x >= self.width || x.saturating_add(len.min(max_width)) > self.width
            {
                self.clipped += 1;
            }
            self.writes.push((y, x, text.to_string()));
            len.min(max_width).min(self.width.saturating_sub(x))
        }
    }
}
