/// Width of one line of the character display
pub const LINE_WIDTH: usize = 16;

/// Two-line title shown for a song
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SongTitle {
    pub top: &'static str,
    pub bottom: &'static str,
}

impl SongTitle {
    pub const fn new(top: &'static str, bottom: &'static str) -> Self {
        Self { top, bottom }
    }

    pub fn lines(&self) -> [&'static str; 2] {
        [self.top, self.bottom]
    }
}

/// Something that can show the current song's title
pub trait TitleDisplay {
    /// Clears the display and writes both lines of `title`
    fn show_title(&mut self, title: &SongTitle);
}

impl<T: TitleDisplay + ?Sized> TitleDisplay for &mut T {
    fn show_title(&mut self, title: &SongTitle) {
        (**self).show_title(title)
    }
}
