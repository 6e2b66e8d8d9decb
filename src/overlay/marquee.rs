/// Gap inserted between the end of a scrolling text and its next repetition.
pub const SEPARATOR: &str = "     ";
pub const SEPARATOR_LEN: usize = SEPARATOR.len();

/// Cyclic sliding window over one overlong text field.
///
/// Lengths are counted in chars. Text that fits in `max_visible` never
/// scrolls and is shown as-is.
#[derive(Debug, Clone, Default)]
pub struct ScrollCursor {
    chars: Vec<char>,
    position: usize,
    paused: bool,
    max_visible: usize,
}

impl ScrollCursor {
    pub fn new(max_visible: usize) -> Self {
        Self {
            chars: Vec::new(),
            position: 0,
            paused: false,
            max_visible,
        }
    }

    /// Replace the text and rewind to the start. The paused flag is kept.
    pub fn reset_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.position = 0;
    }

    pub fn full_text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn scrolls(&self) -> bool {
        self.max_visible > 0 && self.chars.len() > self.max_visible
    }

    /// Length of one full cycle: the text plus the separator.
    pub fn cycle_len(&self) -> usize {
        self.chars.len() + SEPARATOR_LEN
    }

    /// Advance one step. Returns `true` when the visible window changed.
    pub fn tick(&mut self) -> bool {
        if self.paused || !self.scrolls() {
            return false;
        }
        self.position = (self.position + 1) % self.cycle_len();
        true
    }

    /// The window currently on screen.
    pub fn visible(&self) -> String {
        self.frames().next().unwrap_or_default()
    }

    /// Successive windows starting at the current position, forever.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            cursor: self,
            offset: 0,
        }
    }
}

fn window_at(chars: &[char], start: usize, width: usize) -> String {
    let cycle = chars.len() + SEPARATOR_LEN;
    chars
        .iter()
        .copied()
        .chain(SEPARATOR.chars())
        .cycle()
        .skip(start % cycle)
        .take(width)
        .collect()
}

/// Lazy infinite iterator over marquee windows. Calling
/// `ScrollCursor::frames` again restarts it from the cursor.
pub struct Frames<'a> {
    cursor: &'a ScrollCursor,
    offset: usize,
}

impl Iterator for Frames<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let c = self.cursor;
        let frame = if c.scrolls() {
            let start = (c.position + self.offset) % c.cycle_len();
            window_at(&c.chars, start, c.max_visible)
        } else if c.max_visible == 0 {
            String::new()
        } else {
            c.full_text()
        };
        self.offset = self.offset.wrapping_add(1);
        Some(frame)
    }
}
