/// Ticks between two revealed characters.
pub const DIALOG_REVEAL_DELAY_TICKS: u32 = 2;
pub const CHARS_PER_LINE: usize = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Typewriter,
    NextPage,
    Exit,
}

/// Two dialog-box lines for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedPage {
    pub first: String,
    pub second: String,
}

impl WrappedPage {
    pub fn char_count(&self) -> usize {
        self.first.chars().count() + self.second.chars().count()
    }
}

/// Greedy word fill of the first line; everything left goes on the second.
/// The dialog font has no colon, so `:` is drawn as `-`.
pub fn wrap_page(text: &str, chars_per_line: usize) -> WrappedPage {
    let text = text.replace(':', "-");
    let mut words = text.split(' ').peekable();
    let mut first: Vec<&str> = Vec::new();
    let mut first_len = 0usize;

    while let Some(word) = words.next() {
        first_len += word.chars().count() + usize::from(!first.is_empty());
        first.push(word);
        match words.peek() {
            Some(next) if first_len + 1 + next.chars().count() <= chars_per_line => {}
            _ => break,
        }
    }

    WrappedPage {
        first: first.join(" "),
        second: words.collect::<Vec<_>>().join(" "),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pages: Vec<WrappedPage>,
    page: usize,
    letter: usize,
    frame_counter: u32,
    state: DialogState,
}

impl Dialog {
    pub fn new(pages: &[String]) -> Self {
        let mut pages: Vec<WrappedPage> = pages
            .iter()
            .map(|page| wrap_page(page, CHARS_PER_LINE))
            .collect();
        if pages.is_empty() {
            pages.push(WrappedPage::default());
        }
        Self {
            pages,
            page: 0,
            letter: 0,
            frame_counter: 0,
            state: DialogState::Typewriter,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn revealed_chars(&self) -> usize {
        self.letter
    }

    fn current_page(&self) -> &WrappedPage {
        // `page` never passes the last index; see `next_page`.
        &self.pages[self.page.min(self.pages.len() - 1)]
    }

    pub fn tick(&mut self) {
        if self.state != DialogState::Typewriter {
            return;
        }
        self.frame_counter += 1;
        if self.frame_counter >= DIALOG_REVEAL_DELAY_TICKS {
            self.frame_counter = 0;
            self.letter += 1;
        }
        if self.letter >= self.current_page().char_count() {
            self.letter = self.current_page().char_count();
            self.finish_page();
        }
    }

    /// Handles a confirm press. Returns true once the dialog should close.
    pub fn confirm(&mut self) -> bool {
        match self.state {
            DialogState::Typewriter => {
                self.skip();
                false
            }
            DialogState::NextPage => {
                self.next_page();
                false
            }
            DialogState::Exit => true,
        }
    }

    pub fn skip(&mut self) {
        self.letter = self.current_page().char_count();
        self.finish_page();
    }

    fn next_page(&mut self) {
        if self.page + 1 >= self.pages.len() {
            self.state = DialogState::Exit;
            return;
        }
        self.page += 1;
        self.letter = 0;
        self.frame_counter = 0;
        self.state = DialogState::Typewriter;
    }

    fn finish_page(&mut self) {
        self.frame_counter = 0;
        self.state = if self.page + 1 < self.pages.len() {
            DialogState::NextPage
        } else {
            DialogState::Exit
        };
    }

    /// Revealed portion of the current page, split over the two lines.
    pub fn visible_lines(&self) -> (String, String) {
        let page = self.current_page();
        let first_len = page.first.chars().count();
        let first = page.first.chars().take(self.letter).collect();
        let second = page
            .second
            .chars()
            .take(self.letter.saturating_sub(first_len))
            .collect();
        (first, second)
    }
}
