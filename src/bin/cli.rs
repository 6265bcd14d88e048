use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use rollcall::cli::create_admin;
use rollcall::cli::seeder::{
    SEED_PASSWORD, SeedOptions, clear_seeded_data, parse_attendance_rate, seed_database,
};
use rollcall_db::{PgPool, init_db_pool};

#[derive(Parser)]
#[command(name = "rollcall-cli")]
#[command(about = "Rollcall CLI - Administrative tools for Rollcall", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new admin account
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with demo classrooms, students and past sessions
    Seed {
        /// Number of classrooms to create
        #[arg(short = 'c', long, default_value = "3")]
        classrooms: usize,

        /// Number of students enrolled in every classroom
        #[arg(short = 's', long, default_value = "25")]
        students: usize,

        /// Number of ended sessions per classroom
        #[arg(long, default_value = "5")]
        sessions: usize,

        /// Probability that a student attended a past session
        #[arg(long, default_value = "0.85", value_parser = parse_attendance_rate)]
        attendance_rate: f64,
    },
    /// Clear all seeded data
    ClearSeed,
}

fn exit_with(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|e| exit_with("DATABASE_URL must be set", e));

    let pool = init_db_pool(&database_url)
        .await
        .unwrap_or_else(|e| exit_with("Failed to connect to database", e));

    match cli.command {
        Commands::CreateAdmin { email, password } => {
            handle_create_admin(&pool, email, password).await
        }
        Commands::Seed {
            classrooms,
            students,
            sessions,
            attendance_rate,
        } => {
            let options = SeedOptions {
                classrooms,
                students_per_classroom: students,
                past_sessions: sessions,
                attendance_rate,
            };
            handle_seed(&pool, options).await
        }
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

async fn handle_create_admin(pool: &PgPool, email: Option<String>, password: Option<String>) {
    let email = email.unwrap_or_else(|| {
        Input::new()
            .with_prompt("Email address")
            .interact_text()
            .unwrap_or_else(|e| exit_with("Failed to read email", e))
    });

    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| exit_with("Failed to read password", e))
    });

    match create_admin(pool, &email, &password).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   ID: {}", id);
        }
        Err(e) => exit_with("Error creating admin", e.message()),
    }
}

async fn handle_seed(pool: &PgPool, options: SeedOptions) {
    println!("🌱 Seeding database...");

    match seed_database(pool, options).await {
        Ok(summary) => {
            println!("\n✅ Seed complete");
            println!(
                "   Admin: {} / {}",
                summary.admin_email, SEED_PASSWORD
            );
            println!("   Students: {}", summary.students);
            println!(
                "   Sessions: {} ({} attendance records)",
                summary.sessions, summary.records
            );
            for classroom in &summary.classrooms {
                println!("   Classroom: {} (join code {})", classroom.name, classroom.join_code);
            }
        }
        Err(e) => exit_with("Error seeding database", format!("{:#}", e)),
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    match clear_seeded_data(pool).await {
        Ok(users) => println!("\n✅ Removed {} seeded users and their classrooms", users),
        Err(e) => exit_with("Error clearing seeded data", format!("{:#}", e)),
    }
}
