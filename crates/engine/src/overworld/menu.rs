use tracing::debug;

use crate::app::InputAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    OverworldSidebar,
}

impl MenuKind {
    pub fn items(self) -> &'static [&'static str] {
        match self {
            MenuKind::OverworldSidebar => &[
                "POKéDEX", "POKéMON", "BAG", "ASH", "SAVE", "OPTION", "EXIT",
            ],
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            MenuKind::OverworldSidebar => "overworld_sidebar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Close,
    Select,
    Back,
    Navigate(NavigateDirection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuResponse {
    Stay,
    Pop,
}

type MenuHandler = fn(&mut Menu, MenuAction) -> MenuResponse;

impl MenuAction {
    fn handler(self) -> MenuHandler {
        match self {
            MenuAction::Close => Menu::close,
            MenuAction::Select => Menu::select,
            MenuAction::Back => Menu::back,
            MenuAction::Navigate(_) => Menu::navigate,
        }
    }
}

/// Adds `increment` to `value`, wrapping past either end of `0..=max`.
pub fn increment_with_wrap(value: usize, increment: i32, max: usize) -> usize {
    let next = value as i64 + i64::from(increment);
    if next < 0 {
        max
    } else if next > max as i64 {
        0
    } else {
        next as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    kind: MenuKind,
    items: Vec<String>,
    cursor: usize,
    opened: bool,
}

impl Menu {
    pub fn new(kind: MenuKind) -> Self {
        Self {
            kind,
            items: kind.items().iter().map(|item| item.to_string()).collect(),
            cursor: 0,
            opened: false,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn action_for_input(press: InputAction) -> Option<MenuAction> {
        match press {
            InputAction::Start => Some(MenuAction::Close),
            InputAction::Confirm => Some(MenuAction::Select),
            InputAction::Cancel => Some(MenuAction::Back),
            InputAction::MoveUp => Some(MenuAction::Navigate(NavigateDirection::Up)),
            InputAction::MoveDown => Some(MenuAction::Navigate(NavigateDirection::Down)),
            _ => None,
        }
    }

    pub fn apply(&mut self, action: MenuAction) -> MenuResponse {
        (action.handler())(self, action)
    }

    fn close(&mut self, _action: MenuAction) -> MenuResponse {
        // The Start press that opened the menu must not also close it.
        if self.opened {
            MenuResponse::Pop
        } else {
            MenuResponse::Stay
        }
    }

    fn select(&mut self, _action: MenuAction) -> MenuResponse {
        let item = self.items.get(self.cursor).map(String::as_str).unwrap_or("");
        debug!(menu = self.kind.token(), item, "menu_item_selected");
        if item == "EXIT" {
            MenuResponse::Pop
        } else {
            MenuResponse::Stay
        }
    }

    fn back(&mut self, _action: MenuAction) -> MenuResponse {
        MenuResponse::Pop
    }

    fn navigate(&mut self, action: MenuAction) -> MenuResponse {
        let increment = match action {
            MenuAction::Navigate(NavigateDirection::Up) => -1,
            MenuAction::Navigate(NavigateDirection::Down) => 1,
            _ => return MenuResponse::Stay,
        };
        if !self.items.is_empty() {
            self.cursor = increment_with_wrap(self.cursor, increment, self.items.len() - 1);
        }
        MenuResponse::Stay
    }
}

/// Modal menus; only the top one sees input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuStack {
    menus: Vec<Menu>,
}

impl MenuStack {
    pub fn push(&mut self, menu: Menu) {
        debug!(menu = menu.kind().token(), depth = self.menus.len() + 1, "menu_pushed");
        self.menus.push(menu);
    }

    pub fn top(&self) -> Option<&Menu> {
        self.menus.last()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    /// One tick of menu input. Presses go to whichever menu is on top when
    /// they arrive, in order; the top menu counts as opened afterwards.
    pub fn handle_input(&mut self, presses: &[InputAction]) {
        for press in presses {
            let Some(menu) = self.menus.last_mut() else {
                return;
            };
            let Some(action) = Menu::action_for_input(*press) else {
                continue;
            };
            if menu.apply(action) == MenuResponse::Pop {
                if let Some(menu) = self.menus.pop() {
                    debug!(menu = menu.kind().token(), depth = self.menus.len(), "menu_popped");
                }
            }
        }
        if let Some(menu) = self.menus.last_mut() {
            menu.opened = true;
        }
    }
}
