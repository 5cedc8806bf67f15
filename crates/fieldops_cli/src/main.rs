use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use fieldops_cli::cli::{
    Cli, Command, collect_overrides, expand_alias, normalize_parse_error, split_command_line,
};
use fieldops_cli::render;
use fieldops_cli::runtime::{
    AppEvent, BackgroundTasks, TaskOwner, device_from_config, spawn_chat_reply,
    spawn_location_lookup, spawn_photo_load,
};
use fieldops_core::chat::PendingReply;
use fieldops_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use fieldops_core::controller::{
    AppController, ControllerSettings, ListOutcome, SelectOutcome, SubmitOutcome, View,
};
use fieldops_core::error::AppError;
use fieldops_core::geolocation::GeolocationProvider;
use fieldops_core::model::LocationFix;
use fieldops_core::notify::notifier_for;
use fieldops_core::photo::is_image_data_url;
use fieldops_core::storage::seed::{load_seed_or_default, seed_path_from_env};
use fieldops_core::task_form::{FormId, LocationRequest};
use fieldops_core::view::job_list::JobListEvent;
use fieldops_core::view::{
    ChatView, HeaderView, JobListView, LoginView, ProfileView, TaskFormView,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const IDLE_POLL: Duration = Duration::from_millis(10);

enum Flow {
    Continue,
    Exit,
}

/// Owns the controller and everything that feeds it. Only the owner loop
/// calls into it, so the controller never needs locking.
struct Shell {
    controller: AppController,
    config: Config,
    palette: Palette,
    device: Arc<dyn GeolocationProvider>,
    tasks: BackgroundTasks,
    tx: UnboundedSender<AppEvent>,
}

impl Shell {
    fn start(cli: &Cli, tx: UnboundedSender<AppEvent>) -> Result<Self, AppError> {
        let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
        let load = load_config_with_fallback();
        if let Some(err) = load.error.as_ref() {
            eprintln!("ERROR: {err}");
        }
        let config = merge_overrides(&load.config, &overrides);

        let seed_path = seed_path_from_env().or_else(|| config.seed_path.clone());
        let seed = load_seed_or_default(seed_path.as_deref())?;
        let settings = ControllerSettings {
            chat_reply_delay: config.chat_reply_delay(),
            ..ControllerSettings::default()
        };
        let controller =
            AppController::new(seed, notifier_for(config.desktop_notifications)?, settings)?;

        tracing::debug!(
            theme = ?config.theme,
            jobs = controller.jobs().len(),
            "console ready"
        );

        Ok(Self {
            palette: palette_for_theme(config.theme.as_deref()),
            device: device_from_config(&config),
            controller,
            config,
            tasks: BackgroundTasks::new(),
            tx,
        })
    }

    async fn handle_line(
        &mut self,
        line: &str,
        rx: &mut UnboundedReceiver<AppEvent>,
    ) -> Result<Flow, AppError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Ok(Flow::Exit);
        }
        if line == "help" || line == "?" {
            print_help();
            return Ok(Flow::Continue);
        }

        let args = expand_alias(&self.config.aliases, split_command_line(line)?)?;
        if args.is_empty() {
            return Ok(Flow::Continue);
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("fieldops".to_string());
        argv.extend(args);

        let cli = Cli::try_parse_from(argv).map_err(normalize_parse_error)?;
        if !cli.config_override.is_empty() {
            return Err(AppError::invalid_input(
                "config overrides are only accepted at startup",
            ));
        }

        self.run(cli, rx).await?;
        Ok(Flow::Continue)
    }

    async fn run(&mut self, cli: Cli, rx: &mut UnboundedReceiver<AppEvent>) -> Result<(), AppError> {
        if let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) {
            self.controller.login(user, password)?;
        }

        let json = cli.json;
        let Some(command) = cli.command else {
            print_help();
            return Ok(());
        };

        match command {
            Command::Login { username, password } => {
                if username.is_none() || password.is_none() {
                    self.show_login(json)?;
                }
                self.controller.login(
                    username.as_deref().unwrap_or_default(),
                    password.as_deref().unwrap_or_default(),
                )?;
                self.show_jobs(json)?;
            }
            Command::Logout => {
                self.tasks.abort_all();
                self.controller.logout();
                if json {
                    render::print_json(Ok(serde_json::json!({ "logged_in": false })))?;
                } else {
                    println!("Logged out");
                }
            }
            Command::Jobs => {
                self.controller.show_view(View::Jobs)?;
                self.show_jobs(json)?;
            }
            Command::Profile => {
                self.controller.show_view(View::Profile)?;
                self.show_profile(json)?;
            }
            Command::View { name } => {
                let view = View::parse(&name)
                    .ok_or_else(|| AppError::invalid_input(format!("unknown view '{name}'")))?;
                self.controller.show_view(view)?;
                match view {
                    View::Jobs => self.show_jobs(json)?,
                    View::Profile => self.show_profile(json)?,
                }
            }
            Command::Select { id } => {
                let previous = self.controller.task_form().map(|form| form.id());
                let outcome = self
                    .controller
                    .handle_list_event(JobListEvent::Select(id.clone()))?;
                match outcome {
                    ListOutcome::Selected(SelectOutcome::Opened(request)) => {
                        if let Some(previous) = previous {
                            self.tasks.abort_owner(TaskOwner::Form(previous));
                        }
                        self.locate(request);
                        self.show_form(json)?;
                    }
                    ListOutcome::Selected(SelectOutcome::AlreadyOpen) => self.show_form(json)?,
                    ListOutcome::Selected(SelectOutcome::JobCompleted) => {
                        println!("{}", self.palette.mutedize(&format!("{id} is already completed")));
                    }
                    ListOutcome::Selected(SelectOutcome::UnknownJob)
                    | ListOutcome::ChatOpened(_)
                    | ListOutcome::ChatUnavailable => {
                        println!("{}", self.palette.mutedize(&format!("no job {id}")));
                    }
                }
            }
            Command::Form => self.show_form(json)?,
            Command::Photo { path, remove } => {
                if remove {
                    if self.controller.remove_photo()? {
                        println!("Photo removed");
                    }
                } else if let Some(path) = path {
                    let form = self.open_form_id()?;
                    spawn_photo_load(&mut self.tasks, &self.tx, form, path.clone())?;
                    println!("Loading photo {}", path.display());
                }
            }
            Command::Locate => {
                let request = self.controller.refresh_location()?;
                self.locate(request);
                println!("{}", self.palette.mutedize("Mendeteksi lokasi..."));
            }
            Command::Notes { text } => {
                self.controller.set_form_notes(&text.join(" "))?;
            }
            Command::Submit => {
                let form = self.controller.task_form().map(|form| form.id());
                match self.controller.submit_task_form()? {
                    SubmitOutcome::Completed(job) => {
                        if let Some(form) = form {
                            self.tasks.abort_owner(TaskOwner::Form(form));
                        }
                        if json {
                            render::print_json(serde_json::to_value(&job))?;
                        } else {
                            render::print_completed(&job, &self.palette);
                        }
                    }
                    SubmitOutcome::Rejected | SubmitOutcome::UnknownJob => {}
                }
            }
            Command::Close => {
                let form = self.controller.task_form().map(|form| form.id());
                if self.controller.close_task_form() {
                    if let Some(form) = form {
                        self.tasks.abort_owner(TaskOwner::Form(form));
                    }
                    println!("Form closed");
                }
            }
            Command::Complete {
                id,
                photo,
                address,
                lat,
                lng,
            } => {
                if !is_image_data_url(&photo) {
                    return Err(AppError::invalid_input("photo must be an image data URL"));
                }
                let form = self.controller.task_form().map(|form| form.id());
                let location = LocationFix { lat, lng, address };
                if let Some(job) = self.controller.complete_job(&id, &photo, &location)? {
                    if let Some(form) = form
                        && self.controller.task_form().is_none()
                    {
                        self.tasks.abort_owner(TaskOwner::Form(form));
                    }
                    if json {
                        render::print_json(serde_json::to_value(&job))?;
                    } else {
                        render::print_completed(&job, &self.palette);
                    }
                }
            }
            Command::Chat { id } => {
                let previous = self.controller.chat().map(|session| session.id());
                match self
                    .controller
                    .handle_list_event(JobListEvent::OpenChat(id.clone()))?
                {
                    ListOutcome::ChatOpened(Some(_)) => {
                        if let Some(previous) = previous {
                            self.tasks.abort_owner(TaskOwner::Chat(previous));
                        }
                        self.show_chat(json)?;
                    }
                    ListOutcome::ChatUnavailable => println!(
                        "{}",
                        self.palette
                            .mutedize(&format!("{id} is already completed, no chat action"))
                    ),
                    _ => println!("{}", self.palette.mutedize(&format!("no job {id}"))),
                }
            }
            Command::Say { text } => {
                let job_id = self
                    .controller
                    .chat()
                    .map(|session| session.job().id.clone())
                    .unwrap_or_default();
                let pending = self.controller.send_chat_message(&job_id, &text.join(" "))?;
                self.after_send(pending);
            }
            Command::Draft { text } => {
                self.controller.set_chat_draft(&text.join(" "))?;
            }
            Command::Quick { number } => {
                let index = number
                    .checked_sub(1)
                    .ok_or_else(|| AppError::invalid_input("quick reply must be between 1 and 4"))?;
                let phrase = self.controller.apply_quick_reply(index)?;
                println!("Draft: {phrase}");
            }
            Command::Send => {
                let pending = self.controller.send_chat_draft()?;
                self.after_send(pending);
            }
            Command::Messages => self.show_chat(json)?,
            Command::ChatClose => {
                if let Some(session) = self.controller.close_chat() {
                    self.tasks.abort_owner(TaskOwner::Chat(session));
                    println!("Chat closed");
                }
            }
            Command::Wait { ms } => match ms {
                Some(ms) => self.wait_for(Duration::from_millis(ms), rx).await,
                None => self.wait_idle(rx).await,
            },
        }

        Ok(())
    }

    fn open_form_id(&self) -> Result<FormId, AppError> {
        if !self.controller.is_logged_in() {
            return Err(AppError::unauthenticated("login required"));
        }
        self.controller
            .task_form()
            .map(|form| form.id())
            .ok_or_else(|| AppError::invalid_input("no task form is open"))
    }

    fn locate(&mut self, request: LocationRequest) {
        spawn_location_lookup(&mut self.tasks, &self.tx, Arc::clone(&self.device), request);
    }

    fn after_send(&mut self, pending: Option<PendingReply>) {
        let Some(pending) = pending else {
            return;
        };
        if let Some(line) = self
            .controller
            .chat()
            .map(ChatView::project)
            .and_then(|view| view.lines.last().cloned())
        {
            render::print_chat_line(&line, &self.palette);
        }
        println!("{}", self.palette.mutedize("CS Support sedang mengetik..."));
        spawn_chat_reply(&mut self.tasks, &self.tx, pending);
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LocationResolved { request, outcome } => {
                if self.controller.apply_location(&request, outcome)
                    && let Some(fix) = self.controller.task_form().and_then(|form| form.location())
                {
                    render::print_location(&fix.address, &self.palette);
                }
            }
            AppEvent::PhotoLoaded { form, path, result } => match result {
                Ok(data_url) => {
                    let bytes = data_url.len();
                    if self.controller.attach_photo(form, data_url) {
                        println!("Photo attached: {} ({bytes} bytes)", path.display());
                    }
                }
                Err(err) => eprintln!("ERROR: {err}"),
            },
            AppEvent::ChatReplyDue(reply) => match self.controller.deliver_reply(&reply) {
                Ok(true) => {
                    if let Some(line) = self
                        .controller
                        .chat()
                        .map(ChatView::project)
                        .and_then(|view| view.lines.last().cloned())
                    {
                        render::print_chat_line(&line, &self.palette);
                    }
                }
                Ok(false) => {}
                Err(err) => eprintln!("ERROR: {err}"),
            },
        }
    }

    fn drain(&mut self, rx: &mut UnboundedReceiver<AppEvent>) {
        while let Ok(event) = rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Applies results until no background task is left.
    async fn wait_idle(&mut self, rx: &mut UnboundedReceiver<AppEvent>) {
        loop {
            self.drain(rx);
            if self.tasks.is_idle() {
                // A finished task has already sent its event.
                self.drain(rx);
                return;
            }

            tokio::select! {
                Some(event) = rx.recv() => self.apply_event(event),
                _ = tokio::time::sleep(IDLE_POLL) => {}
            }
        }
    }

    async fn wait_for(&mut self, duration: Duration, rx: &mut UnboundedReceiver<AppEvent>) {
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                Some(event) = rx.recv() => self.apply_event(event),
            }
        }
        self.drain(rx);
    }

    fn show_login(&self, json: bool) -> Result<(), AppError> {
        let view = LoginView::default();
        if json {
            render::print_json(serde_json::to_value(&view))
        } else {
            render::print_login(&view, &self.palette);
            Ok(())
        }
    }

    fn show_jobs(&self, json: bool) -> Result<(), AppError> {
        let jobs = self.controller.jobs();
        let view = JobListView::project(jobs, true);
        if json {
            return render::print_json(serde_json::to_value(&view));
        }
        render::print_header(
            &HeaderView::project(jobs),
            self.controller.username(),
            &self.palette,
        );
        render::print_job_list(&view, &self.palette);
        Ok(())
    }

    fn show_profile(&self, json: bool) -> Result<(), AppError> {
        let view = ProfileView::project(self.controller.employee());
        if json {
            render::print_json(serde_json::to_value(&view))
        } else {
            render::print_profile(&view, &self.palette);
            Ok(())
        }
    }

    fn show_form(&self, json: bool) -> Result<(), AppError> {
        let form = self
            .controller
            .task_form()
            .ok_or_else(|| AppError::invalid_input("no task form is open"))?;
        let view = TaskFormView::project(form);
        if json {
            render::print_json(serde_json::to_value(&view))
        } else {
            render::print_form(&view, &self.palette);
            Ok(())
        }
    }

    fn show_chat(&self, json: bool) -> Result<(), AppError> {
        let session = self
            .controller
            .chat()
            .ok_or_else(|| AppError::invalid_input("chat is not open"))?;
        let view = ChatView::project(session);
        if json {
            render::print_json(serde_json::to_value(&view))
        } else {
            render::print_chat(&view, &self.palette);
            Ok(())
        }
    }
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

async fn run_interactive(
    mut shell: Shell,
    mut rx: UnboundedReceiver<AppEvent>,
) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match shell.handle_line(&line, &mut rx).await {
                    Ok(Flow::Exit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) => eprintln!("ERROR: {err}"),
                }
            }
            Some(event) = rx.recv() => shell.apply_event(event),
        }
    }

    shell.tasks.abort_all();
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (tx, mut rx) = unbounded_channel();
    let mut shell = Shell::start(&cli, tx)?;

    if cli.command.is_none() {
        if let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) {
            shell.controller.login(user, password)?;
        }
        return run_interactive(shell, rx).await;
    }

    shell.run(cli, &mut rx).await?;
    shell.wait_idle(&mut rx).await;
    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: {}", AppError::from(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run(cli)) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
