mod config;
mod seed;
mod terminal;

use learn_core::model::{AssessmentSettings, Landing, UserId};
use services::{AppServices, Clock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::vm::{map_progress_rows, map_result_cards};

use config::{Args, Command, prepare_sqlite_file, print_usage};

const HISTORY_LIMIT: u32 = 20;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn landing_hint(landing: Landing) -> &'static str {
    match landing {
        Landing::Onboarding => "onboarding (run `onboard` first)",
        Landing::Login => "login (run `login`)",
        Landing::Home => "home",
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let parsed = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    let Some(args) = parsed else {
        print_usage();
        return Ok(());
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(
        &args.db_url,
        Clock::system(),
        AssessmentSettings::default(),
    )
    .await?;
    tracing::debug!("Opened {}", args.db_url);

    let mut session = app.session_state().await?;

    match args.command {
        Command::Status => {
            println!("Session: {:?}", session.state());
            println!("Landing: {}", landing_hint(session.landing()));
            if let Some(user) = session.current_user().await? {
                println!("User: {user}");
            }
        }
        Command::Onboard => {
            session.complete_onboarding().await?;
            println!("Onboarding complete. Landing: {}", landing_hint(session.landing()));
        }
        Command::Login => {
            let user = args.user_id.unwrap_or_else(UserId::random);
            session.log_in(user).await?;
            println!("Logged in as {user}");
        }
        Command::Logout => {
            session.log_out().await?;
            println!("Logged out.");
        }
        Command::Seed => {
            let count = seed::seed_demo(app.storage().quizzes.as_ref()).await?;
            println!("Seeded {count} questions.");
        }
        Command::Quiz => {
            if session.landing() != Landing::Home {
                eprintln!("Not signed in. Landing: {}", landing_hint(session.landing()));
                return Ok(());
            }
            terminal::run_quiz(app.assessments().as_ref(), args.quiz_id).await?;
        }
        Command::History => {
            let Some(user) = session.current_user().await? else {
                eprintln!("Not signed in. Landing: {}", landing_hint(session.landing()));
                return Ok(());
            };
            let history = app.history();
            for row in map_progress_rows(&history.progress(user).await?) {
                println!(
                    "{}: best {} over {} attempt(s)",
                    row.quiz_label, row.best_label, row.attempts
                );
            }
            for card in map_result_cards(&history.recent(user, HISTORY_LIMIT).await?) {
                let time = card.time_taken_label.as_deref().unwrap_or("untimed");
                println!(
                    "  #{} {} {} ({time}) at {}",
                    card.id, card.quiz_label, card.score_label, card.completed_at_str
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
