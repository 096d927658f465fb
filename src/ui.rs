// ─── Terminal UI ───
// Screen helpers shared by the menus: themed styles, prompts and the
// provisioning progress bar.

use console::{style, Color, StyledObject, Term};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::auth::DeviceCodePrompt;
use crate::core::error::LauncherResult;
use crate::core::installer::ProgressReporter;
use crate::core::state::preferences::{theme_or_default, Theme};

const RULE_WIDTH: usize = 56;

const BANNER: &str = r#"
 ____  _            _    _                        _
| __ )| | ___   ___| | _| | __ _ _   _ _ __   ___| |__
|  _ \| |/ _ \ / __| |/ / |/ _` | | | | '_ \ / __| '_ \
| |_) | | (_) | (__|   <| | (_| | |_| | | | | (__| | | |
|____/|_|\___/ \___|_|\_\_|\__,_|\__,_|_| |_|\___|_| |_|
"#;

pub struct Ui {
    term: Term,
    theme: &'static Theme,
}

impl Ui {
    pub fn new(theme_id: &str) -> Self {
        Self {
            term: Term::stdout(),
            theme: theme_or_default(theme_id),
        }
    }

    pub fn set_theme(&mut self, theme_id: &str) {
        self.theme = theme_or_default(theme_id);
    }

    pub fn primary<D>(&self, text: D) -> StyledObject<D> {
        style(text).fg(self.theme.primary_color()).bold()
    }

    pub fn secondary<D>(&self, text: D) -> StyledObject<D> {
        style(text).fg(self.theme.secondary_color())
    }

    pub fn dim<D>(&self, text: D) -> StyledObject<D> {
        style(text).dim()
    }

    pub fn clear(&self) -> LauncherResult<()> {
        self.term.clear_screen()?;
        Ok(())
    }

    fn rule(&self) -> String {
        self.secondary("─".repeat(RULE_WIDTH)).to_string()
    }

    /// Banner plus the signed-in line.
    pub fn header(&self, signed_in: Option<(&str, &str, usize)>) -> LauncherResult<()> {
        self.clear()?;
        println!("{}", self.primary(BANNER));
        println!("   {}", self.rule());
        match signed_in {
            Some((name, version, accounts)) => {
                let extra = if accounts > 1 {
                    format!("  ({accounts} accounts)")
                } else {
                    String::new()
                };
                println!(
                    "   {} Signed in as {}{}   | Version: {}",
                    style("*").fg(Color::Green).bold(),
                    style(name).fg(Color::Green).bold(),
                    self.dim(extra),
                    self.primary(version)
                );
            }
            None => println!("   {}", self.dim("*  No account signed in")),
        }
        println!("   {}", self.rule());
        println!();
        Ok(())
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("   {}", self.rule());
        println!("   {}", style(title).bold());
        println!("   {}", self.rule());
        println!();
    }

    pub fn item(&self, key: &str, label: &str) {
        println!("   {}  {}", style(format!("[{key}]")).bold(), self.primary(label));
    }

    pub fn item_with_value(&self, key: &str, label: &str, value: &str) {
        println!(
            "   {}  {:<24} {} {}",
            style(format!("[{key}]")).bold(),
            self.primary(label),
            self.dim("current:"),
            self.secondary(value)
        );
    }

    /// Read one line. Returns it trimmed.
    pub fn prompt(&self) -> LauncherResult<String> {
        let line: String = Input::new()
            .with_prompt("   >")
            .allow_empty(true)
            .interact_text()?;
        Ok(line.trim().to_string())
    }

    pub fn pause(&self, message: &str) -> LauncherResult<()> {
        println!();
        let _: String = Input::new()
            .with_prompt(format!("   {}", self.dim(message)))
            .allow_empty(true)
            .report(false)
            .interact_text()?;
        Ok(())
    }

    pub fn footer(&self) {
        println!();
        println!(
            "   {} {}",
            self.dim("Blocklaunch"),
            self.dim(env!("CARGO_PKG_VERSION"))
        );
        println!();
    }

    pub fn device_code<P>(&self, prompt: &DeviceCodePrompt<P>) {
        let border = self.secondary("─".repeat(48));
        println!();
        println!("   ┌{border}┐");
        println!("   │  Open:  {}", style(&prompt.verification_uri).bold());
        println!(
            "   │  Code:  {}",
            style(&prompt.user_code).fg(Color::Green).bold()
        );
        println!(
            "   │  {}",
            self.dim(format!(
                "The code expires in {} minutes",
                prompt.expires_in.as_secs() / 60
            ))
        );
        println!("   └{border}┘");
        println!();
    }

    pub fn progress(&self) -> BarProgress {
        BarProgress::new()
    }
}

/// Provisioning progress rendered with `indicatif`.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("   {msg:<36} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressReporter for BarProgress {
    fn set_status(&mut self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    fn set_max(&mut self, max: u64) {
        self.bar.set_length(max);
        self.bar.set_position(0);
    }

    fn set_progress(&mut self, value: u64) {
        self.bar.set_position(value);
    }
}
