//! Sidenav, searchbar and delete-modal toggles.
//!
//! Each control keeps its own visibility and derives the style declarations
//! to apply from it, instead of reading the element's live style back.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub fn flipped(self) -> Self {
        match self {
            Visibility::Hidden => Visibility::Visible,
            Visibility::Visible => Visibility::Hidden,
        }
    }
}

/// The edge a panel slides in from; it names the offset property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

impl Edge {
    pub fn property(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }
}

/// A CSS property/value pair to set on the element.
pub type Declaration = (&'static str, &'static str);

/// A panel shown with opacity `1` at offset `0%` and hidden with opacity
/// `0` at offset `-100%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePanel {
    pub element_id: &'static str,
    pub edge: Edge,
    state: Visibility,
}

impl SlidePanel {
    pub fn new(element_id: &'static str, edge: Edge) -> Self {
        Self { element_id, edge, state: Visibility::Hidden }
    }

    /// Seeds the state from an observed inline style. Anything but the
    /// visible pair counts as hidden, including an unstyled element.
    pub fn from_style(element_id: &'static str, edge: Edge, opacity: &str, offset: &str) -> Self {
        let state = if opacity.trim() == "1" && offset.trim() == "0%" {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        Self { element_id, edge, state }
    }

    pub fn visibility(&self) -> Visibility {
        self.state
    }

    pub fn style(&self) -> [Declaration; 2] {
        let (opacity, offset) = match self.state {
            Visibility::Visible => ("1", "0%"),
            Visibility::Hidden => ("0", "-100%"),
        };
        [("opacity", opacity), (self.edge.property(), offset)]
    }

    pub fn toggle(&mut self) -> [Declaration; 2] {
        self.state = self.state.flipped();
        self.style()
    }
}

/// A modal shown with `display: block` and hidden with `display: none`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub element_id: &'static str,
    state: Visibility,
}

impl Modal {
    pub fn new(element_id: &'static str) -> Self {
        Self { element_id, state: Visibility::Hidden }
    }

    pub fn from_display(element_id: &'static str, display: &str) -> Self {
        let state = if display.trim() == "block" {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        Self { element_id, state }
    }

    pub fn visibility(&self) -> Visibility {
        self.state
    }

    pub fn style(&self) -> Declaration {
        match self.state {
            Visibility::Visible => ("display", "block"),
            Visibility::Hidden => ("display", "none"),
        }
    }

    pub fn toggle(&mut self) -> Declaration {
        self.state = self.state.flipped();
        self.style()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleController {
    pub sidenav: SlidePanel,
    pub searchbar: SlidePanel,
    pub delete_modal: Modal,
}

impl Default for ToggleController {
    fn default() -> Self {
        Self {
            sidenav: SlidePanel::new("sidenav", Edge::Left),
            searchbar: SlidePanel::new("searchbar", Edge::Right),
            delete_modal: Modal::new("modal_delete"),
        }
    }
}

impl ToggleController {
    pub fn toggle_sidenav(&mut self) -> [Declaration; 2] {
        self.sidenav.toggle()
    }

    pub fn toggle_searchbar(&mut self) -> [Declaration; 2] {
        self.searchbar.toggle()
    }

    pub fn toggle_delete_modal(&mut self) -> Declaration {
        self.delete_modal.toggle()
    }

    /// Toggles the control bound to `element_id`, returning the declarations
    /// to apply, or `None` for an unknown element.
    pub fn toggle(&mut self, element_id: &str) -> Option<Vec<Declaration>> {
        if element_id == self.sidenav.element_id {
            Some(self.toggle_sidenav().to_vec())
        } else if element_id == self.searchbar.element_id {
            Some(self.toggle_searchbar().to_vec())
        } else if element_id == self.delete_modal.element_id {
            Some(vec![self.toggle_delete_modal()])
        } else {
            None
        }
    }
}
