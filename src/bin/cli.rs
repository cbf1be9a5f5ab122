use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;

use orar::cli::{issue_token, seed_calendar};
use orar::store::postgres::PgStore;
use orar_config::{DatabaseConfig, JwtConfig};
use orar_db::{init_db_pool, run_migrations};
use orar_models::users::{Principal, UserRole};

#[derive(Parser)]
#[command(name = "orar-cli")]
#[command(about = "Orar CLI - Administrative tools for the timetable API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Secretar,
    Profesor,
    Student,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Secretar => UserRole::Secretar,
            RoleArg::Profesor => UserRole::Profesor,
            RoleArg::Student => UserRole::Student,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create the current academic year and the default learning cycles
    SeedCalendar {
        /// Email of the administrator recorded as creator
        #[arg(long, default_value = "admin@orar.local")]
        admin_email: String,
    },
    /// Register a user and print a signed access token for it
    IssueToken {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 'r', long, value_enum)]
        role: RoleArg,

        #[arg(short = 'f', long, default_value = "Dev")]
        first_name: String,

        #[arg(short = 'l', long, default_value = "User")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => {
            run_migrations(&pool).await?;
            println!("✅ Migrations applied");
        }
        Commands::SeedCalendar { admin_email } => {
            let store = PgStore::new(pool);
            let admin = store
                .upsert_user("System", "Administrator", &admin_email, UserRole::Admin)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            let today = chrono::Local::now().date_naive();

            let report = seed_calendar(&store, &Principal::from(&admin), today)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("🌱 Calendar seeded");
            println!("   - Academic years created: {}", report.academic_years_created);
            println!("   - Learning types created: {}", report.learning_types_created);
            println!("   - Study years created: {}", report.study_years_created);
        }
        Commands::IssueToken {
            email,
            role,
            first_name,
            last_name,
        } => {
            let store = PgStore::new(pool);
            let token = issue_token(
                &store,
                &first_name,
                &last_name,
                &email,
                role.into(),
                &JwtConfig::from_env(),
            )
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

            println!("{}", token);
        }
    }

    Ok(())
}
