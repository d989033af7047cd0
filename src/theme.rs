use console::Style;

/// Terminal styling, fixed once from the command line.
///
/// A disabled theme returns text untouched, so renderers never need to know
/// whether color is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
  enabled: bool,
}

impl Theme {
  /// Color unless `--no-color` was given or the terminal cannot show it.
  #[must_use]
  pub fn from_flags(no_color: bool) -> Self {
    Self {
      enabled: !no_color && console::colors_enabled(),
    }
  }

  #[must_use]
  pub const fn plain() -> Self {
    Self { enabled: false }
  }

  #[must_use]
  pub const fn colored() -> Self {
    Self { enabled: true }
  }

  #[must_use]
  pub const fn is_enabled(self) -> bool {
    self.enabled
  }

  fn paint(self, style: Style, text: &str) -> String {
    if self.is_enabled() {
      style.force_styling(true).apply_to(text).to_string()
    } else {
      text.to_string()
    }
  }

  pub fn heading(self, text: &str) -> String {
    self.paint(Style::new().bold(), text)
  }

  pub fn label(self, text: &str) -> String {
    self.paint(Style::new().cyan(), text)
  }

  pub fn warn(self, text: &str) -> String {
    self.paint(Style::new().yellow(), text)
  }

  pub fn error(self, text: &str) -> String {
    self.paint(Style::new().red(), text)
  }

  pub fn info(self, text: &str) -> String {
    self.paint(Style::new().blue(), text)
  }

  pub fn success(self, text: &str) -> String {
    self.paint(Style::new().green(), text)
  }
}
