// ─── Menu Commands ───
// Interactive menus: guest and signed-in main menus, account management,
// version/theme/language pickers and the running-game screen.

use tracing::{error, info, warn};

use crate::core::accounts::{active_index_after_removal, Credential, SaveOutcome};
use crate::core::auth::{self, AuthGateway};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{format_uptime, LaunchOrchestrator, LaunchSession, SessionStatus};
use crate::core::state::preferences::{language_name, theme_or_default, LANGUAGES, THEMES};
use crate::core::state::AppState;
use crate::core::supervisor::ProcessSupervisor;
use crate::core::version::{versions_in_group, GameVersion, VERSION_GROUPS};
use crate::interrupt::Interrupts;
use crate::ui::Ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Parse a 1-based menu number into an index below `len`.
fn parse_index(choice: &str, len: usize) -> Option<usize> {
    match choice.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n - 1),
        _ => None,
    }
}

pub struct Launcher<G: AuthGateway> {
    state: AppState,
    ui: Ui,
    orchestrator: LaunchOrchestrator,
    gateway: G,
    interrupts: Interrupts,
}

impl<G: AuthGateway> Launcher<G> {
    pub fn new(
        state: AppState,
        orchestrator: LaunchOrchestrator,
        gateway: G,
        interrupts: Interrupts,
    ) -> Self {
        let ui = Ui::new(&state.preferences.theme);
        Self {
            state,
            ui,
            orchestrator,
            gateway,
            interrupts,
        }
    }

    /// Main loop. Returns when the user chooses to exit, or with
    /// [`LauncherError::Interrupted`] after a Ctrl-C outside sign-in.
    pub async fn run(&mut self) -> LauncherResult<()> {
        loop {
            if self.interrupts.take() {
                return Err(LauncherError::Interrupted);
            }
            let flow = match self.state.active_account() {
                Some(active) => self.signed_in_menu(active).await?,
                None => self.guest_menu().await?,
            };
            if flow == Flow::Exit {
                info!("Goodbye");
                return Ok(());
            }
        }
    }

    fn settings_items(&self) {
        let prefs = &self.state.preferences;
        println!();
        self.ui.item_with_value("T", "Change theme", theme_or_default(&prefs.theme).label);
        self.ui.item_with_value(
            "L",
            "Change language",
            language_name(&prefs.language).unwrap_or("?"),
        );
        self.ui.footer();
    }

    async fn guest_menu(&mut self) -> LauncherResult<Flow> {
        self.ui.header(None)?;
        self.ui.item("1", "Sign in with Microsoft");
        self.ui.item("2", "Exit");
        self.settings_items();

        match self.ui.prompt()?.to_lowercase().as_str() {
            "1" => {
                self.sign_in().await?;
            }
            "2" => return Ok(Flow::Exit),
            "t" => self.select_theme()?,
            "l" => self.select_language()?,
            other => self.invalid_choice(other)?,
        }
        Ok(Flow::Continue)
    }

    async fn signed_in_menu(&mut self, active: Credential) -> LauncherResult<Flow> {
        let accounts = self.state.accounts.load_all().len();
        let version = self.state.preferences.version.to_string();
        self.ui
            .header(Some((active.name.as_str(), version.as_str(), accounts)))?;
        self.ui.item("1", "Launch game");
        self.ui.item("2", "Select version");
        self.ui.item("3", "Open game folder");
        self.ui.item("4", "Manage accounts");
        self.ui.item("5", "Log out");
        self.ui.item("6", "Exit");
        self.settings_items();

        match self.ui.prompt()?.to_lowercase().as_str() {
            "1" => {
                let chosen = if accounts > 1 {
                    self.pick_account_for_launch()?
                } else {
                    Some(active)
                };
                if let Some(credential) = chosen {
                    self.launch(credential)?;
                }
            }
            "2" => self.select_version()?,
            "3" => {
                self.open_game_folder();
                self.ui.pause("Press Enter to continue...")?;
            }
            "4" => self.manage_accounts().await?,
            "5" => {
                self.state.accounts.clear()?;
                self.state.set_active_account(0)?;
                info!("Logged out, all accounts removed");
                self.ui.pause("Press Enter to continue...")?;
            }
            "6" => return Ok(Flow::Exit),
            "t" => self.select_theme()?,
            "l" => self.select_language()?,
            other => self.invalid_choice(other)?,
        }
        Ok(Flow::Continue)
    }

    fn invalid_choice(&self, choice: &str) -> LauncherResult<()> {
        warn!("Invalid choice {:?}", choice);
        self.ui.pause("Press Enter to continue...")
    }

    /// Device-code sign-in. Failures and Ctrl-C are reported and leave the
    /// store untouched.
    async fn sign_in(&mut self) -> LauncherResult<Option<Credential>> {
        info!("Starting Microsoft sign-in...");
        let ui = &self.ui;
        let signing_in = auth::authenticate(&self.gateway, |prompt| {
            ui.device_code(prompt);
            if let Err(err) = open::that(&prompt.verification_uri) {
                tracing::debug!("Cannot open browser: {}", err);
            }
            info!("Waiting for the sign-in to complete in the browser...");
        });
        let outcome = tokio::select! {
            result = signing_in => Some(result),
            () = self.interrupts.recv() => None,
        };
        let Some(result) = outcome else {
            warn!("Sign-in cancelled");
            self.ui.pause("Press Enter to continue...")?;
            return Ok(None);
        };

        let credential = match result {
            Ok(credential) => credential,
            Err(err) if err.is_interrupt() => return Err(err),
            Err(err) => {
                error!("{}", err);
                self.ui.pause("Press Enter to continue...")?;
                return Ok(None);
            }
        };

        match self.state.accounts.save(credential.clone())? {
            SaveOutcome::Added => info!("Signed in as {}", credential.name),
            SaveOutcome::Updated => info!("Account {} refreshed", credential.name),
        }
        self.ui.pause("Press Enter to continue...")?;
        Ok(Some(credential))
    }

    fn pick_account_for_launch(&self) -> LauncherResult<Option<Credential>> {
        let accounts = self.state.accounts.load_all();
        if accounts.len() <= 1 {
            return Ok(accounts.into_iter().next());
        }

        self.ui.clear()?;
        self.ui.section("Choose an account to launch with");
        for (i, account) in accounts.iter().enumerate() {
            println!(
                "   [{}]  {}  {}",
                i + 1,
                self.ui.primary(&account.name),
                self.ui.dim(format!("({}...)", account.short_uuid()))
            );
        }
        println!("\n   {}\n", self.ui.dim("0) Cancel"));

        loop {
            let choice = self.ui.prompt()?;
            if choice == "0" {
                return Ok(None);
            }
            match parse_index(&choice, accounts.len()) {
                Some(index) => {
                    info!("Selected account {}", accounts[index].name);
                    return Ok(Some(accounts[index].clone()));
                }
                None => warn!("Invalid choice {:?}", choice),
            }
        }
    }

    fn launch(&self, credential: Credential) -> LauncherResult<()> {
        let version = self.state.preferences.version.clone();
        self.ui.clear()?;
        self.ui.section(&format!("Launching Minecraft {version}"));

        let mut progress = self.ui.progress();
        match self.orchestrator.launch(&credential, &version, &mut progress) {
            Ok(session) => {
                progress.finish();
                self.running_loop(session)
            }
            Err(_) => {
                progress.abandon();
                self.ui.pause("Press Enter to return to the menu...")
            }
        }
    }

    fn running_loop(&self, session: LaunchSession) -> LauncherResult<()> {
        let mut supervisor = ProcessSupervisor::new(&self.orchestrator, session);
        loop {
            if self.interrupts.take() {
                return Err(LauncherError::Interrupted);
            }
            match supervisor.poll() {
                Ok(SessionStatus::Running) => {}
                Ok(SessionStatus::Exited(code)) => {
                    self.ui.clear()?;
                    match code {
                        Some(code) => info!("Minecraft closed (exit code {})", code),
                        None => info!("Minecraft closed"),
                    }
                    return self.ui.pause("Press Enter to return to the menu...");
                }
                Err(err) => {
                    error!("{}", err);
                    return self.ui.pause("Press Enter to return to the menu...");
                }
            }

            let session = supervisor.session();
            self.ui.header(Some((
                session.credential.name.as_str(),
                session.version.as_str(),
                1,
            )))?;
            println!(
                "   {}  Minecraft {} is running  {}",
                self.ui.primary(">"),
                session.version,
                self.ui.dim(format!(
                    "(PID {}, up {})",
                    session.pid(),
                    format_uptime(session.uptime())
                ))
            );
            println!();
            self.ui.item("1", "Close the game");
            self.ui.item("2", "Restart the game");
            println!("   {}", self.ui.dim("Press Enter to refresh"));
            self.ui.footer();

            match self.ui.prompt()?.as_str() {
                "" => {}
                "1" => {
                    match supervisor.terminate() {
                        Ok(_) => info!("Game closed"),
                        Err(err) => error!("{}", err),
                    }
                    return self.ui.pause("Press Enter to return to the menu...");
                }
                "2" => {
                    info!("Restarting...");
                    let mut progress = self.ui.progress();
                    match supervisor.restart(&mut progress) {
                        Ok(()) => progress.finish(),
                        Err(err) => {
                            progress.abandon();
                            error!("{}", err);
                            return self.ui.pause("Press Enter to return to the menu...");
                        }
                    }
                }
                other => warn!("Invalid choice {:?}", other),
            }
        }
    }

    fn select_version(&mut self) -> LauncherResult<()> {
        let current = self.state.preferences.version.clone();
        self.ui.clear()?;
        self.ui.section("Select version");
        println!("   Current: {}\n", self.ui.primary(&current));

        let mut numbered: Vec<GameVersion> = Vec::new();
        for group in VERSION_GROUPS {
            println!("   {}", self.ui.secondary(format!("── {group}.x")));
            let mut row = String::new();
            for (column, version) in versions_in_group(group).into_iter().enumerate() {
                numbered.push(version);
                let version = &numbered[numbered.len() - 1];
                let mark = if *version == current { "*" } else { "-" };
                row.push_str(&format!("   {:>2}) {} {:<10}", numbered.len(), mark, version));
                if column % 4 == 3 {
                    println!("{row}");
                    row.clear();
                }
            }
            if !row.is_empty() {
                println!("{row}");
            }
            println!();
        }
        println!("   {}\n", self.ui.dim("0) Back to menu"));

        loop {
            let choice = self.ui.prompt()?;
            if choice == "0" {
                return Ok(());
            }
            if let Some(index) = parse_index(&choice, numbered.len()) {
                let selected = numbered.swap_remove(index);
                info!("Version selected: {}", selected);
                self.state.preferences.version = selected;
                return self.state.save_preferences();
            }
            warn!("Invalid choice {:?}", choice);
        }
    }

    fn select_theme(&mut self) -> LauncherResult<()> {
        self.ui.clear()?;
        self.ui.section("Theme");
        let current = self.state.preferences.theme.clone();
        for (i, theme) in THEMES.iter().enumerate() {
            let mark = if theme.id == current { "*" } else { " " };
            println!(
                "   {:>2}) {} {}",
                i + 1,
                mark,
                console::style(theme.label).fg(theme.primary_color()).bold()
            );
        }
        println!("\n   {}\n", self.ui.dim("0) Back to menu"));

        loop {
            let choice = self.ui.prompt()?;
            if choice == "0" {
                return Ok(());
            }
            if let Some(index) = parse_index(&choice, THEMES.len()) {
                let theme = &THEMES[index];
                self.state.preferences.theme = theme.id.to_string();
                self.ui.set_theme(theme.id);
                info!("Theme applied: {}", theme.label);
                return self.state.save_preferences();
            }
            warn!("Invalid choice {:?}", choice);
        }
    }

    fn select_language(&mut self) -> LauncherResult<()> {
        self.ui.clear()?;
        self.ui.section("Language");
        let current = self.state.preferences.language.clone();
        for (i, (code, name)) in LANGUAGES.iter().enumerate() {
            let mark = if *code == current { "*" } else { " " };
            println!("   {:>2}) {} {}", i + 1, mark, self.ui.primary(name));
        }
        println!("\n   {}\n", self.ui.dim("0) Back to menu"));

        loop {
            let choice = self.ui.prompt()?;
            if choice == "0" {
                return Ok(());
            }
            if let Some(index) = parse_index(&choice, LANGUAGES.len()) {
                let (code, name) = LANGUAGES[index];
                self.state.preferences.language = code.to_string();
                info!("Language applied: {}", name);
                return self.state.save_preferences();
            }
            warn!("Invalid choice {:?}", choice);
        }
    }

    fn open_game_folder(&self) {
        let dir = match self.state.paths.ensure_game_dir() {
            Ok(dir) => dir,
            Err(err) => {
                error!("{}", err);
                return;
            }
        };
        info!("Opening {:?}", dir);
        match open::that(dir) {
            Ok(()) => info!("Folder opened"),
            Err(err) => warn!("Cannot open {:?}: {}", dir, err),
        }
    }

    async fn manage_accounts(&mut self) -> LauncherResult<()> {
        loop {
            let accounts = self.state.accounts.load_all();
            let active = self.state.active_account().map(|c| c.uuid);

            self.ui.clear()?;
            self.ui.section("Accounts");
            if accounts.is_empty() {
                println!("   {}\n", self.ui.dim("No saved accounts"));
            }
            for (i, account) in accounts.iter().enumerate() {
                let mark = if active.as_deref() == Some(account.uuid.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "   {}. {} {}  {}",
                    i + 1,
                    mark,
                    self.ui.primary(&account.name),
                    self.ui.dim(format!("UUID: {}...", account.short_uuid()))
                );
            }
            println!();
            self.ui.item("A", "Add account");
            if !accounts.is_empty() {
                self.ui.item("R", "Remove account");
                self.ui.item("D", "Account details");
                self.ui.item("S", "Set active account");
            }
            self.ui.item("0", "Back to menu");
            self.ui.footer();

            let choice = self.ui.prompt()?.to_lowercase();
            match choice.as_str() {
                "0" => return Ok(()),
                "a" => {
                    self.sign_in().await?;
                }
                "r" | "d" | "s" if !accounts.is_empty() => {
                    println!("\n   Which account? (1-{}, 0 to cancel)", accounts.len());
                    let pick = self.ui.prompt()?;
                    if pick == "0" {
                        continue;
                    }
                    let Some(index) = parse_index(&pick, accounts.len()) else {
                        warn!("Invalid index {:?}", pick);
                        self.ui.pause("Press Enter to continue...")?;
                        continue;
                    };
                    match choice.as_str() {
                        "r" => self.remove_account(index, &accounts[index])?,
                        "d" => self.show_details(&accounts[index]),
                        _ => {
                            self.state.set_active_account(index)?;
                            info!("Active account: {}", accounts[index].name);
                        }
                    }
                    self.ui.pause("Press Enter to continue...")?;
                }
                other => self.invalid_choice(other)?,
            }
        }
    }

    fn remove_account(&mut self, index: usize, account: &Credential) -> LauncherResult<()> {
        if !self.state.accounts.remove(index)? {
            warn!("Account {} no longer exists", index + 1);
            return Ok(());
        }
        info!("{} removed", account.name);

        let active = self.state.preferences.active_account;
        let adjusted = active_index_after_removal(active, index);
        if adjusted != active {
            self.state.set_active_account(adjusted)?;
        }
        Ok(())
    }

    fn show_details(&self, account: &Credential) {
        self.ui.section("Account data");
        println!("    Name:   {}", self.ui.primary(&account.name));
        println!("    UUID:   {}", self.ui.dim(&account.uuid));
        println!("    Token:  {}", self.ui.dim(account.token_preview()));
    }
}
