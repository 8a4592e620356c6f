use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use lectern::Config;
use lectern::auth::{CryptError, IdentityClaims, generate_token};
use lectern::model::entity::{
    Course, CourseCreate, Lesson, LessonCreate, Profile, Question, QuestionCreate, Quiz,
    QuizCreate,
};
use lectern::model::{CrudRepository, DbConnection, ModelManager, ResourceType};
use lectern::service::ServiceError;
use lectern::web::{AuthenticatedUser, UserRole};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for seeding the course marketplace DB", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage user profiles
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes and their questions
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Local access tokens signed with the configured identity secret
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create the profile if needed and set its role
    Promote {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        email: String,
        /// student, instructor or admin
        #[arg(long, default_value = "instructor")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Email of the instructor profile
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Minor currency units, 0 is free
        #[arg(long, default_value_t = 0)]
        price: i64,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        course_id: Uuid,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: Option<String>,
        #[arg(long, default_value_t = 0)]
        duration_secs: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        #[arg(long)]
        course_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 70)]
        passing_score: i32,
    },
    AddQuestion {
        #[arg(long)]
        quiz_id: Uuid,
        #[arg(long)]
        prompt: String,
        /// Option in `key=text` form, repeat for every option
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
        #[arg(long)]
        correct_key: String,
        #[arg(long, default_value_t = 1)]
        points: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    Mint {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=text, got `{raw}`"))
}

#[tokio::main]
async fn main() -> lectern::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let config = Config::get_or_init(true).await;
    let db_con = DbConnection::connect(config.app().database_uri())?;
    let mm = ModelManager::new(db_con);
    let admin = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Promote { id, email, role } => {
                let profile = Profile::ensure(&mm, id, &email).await?;
                let profile = profile
                    .set_role(&mm, &admin, UserRole::from(role.as_str()))
                    .await?;
                println!("Profile updated: {:?}", profile);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { instructor, title, description, price, published } => {
                let Some(profile) = Profile::find_by_email(&mm, &admin, &instructor).await? else {
                    println!("No profile with email {instructor}");
                    return Ok(());
                };
                let actor = AuthenticatedUser::new(profile.id(), profile.role());

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        price: Some(price),
                        published: Some(published),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { course_id, title, file, duration_secs, order_index } => {
                let content = match file {
                    Some(file) => std::fs::read_to_string(file)?,
                    None => String::new(),
                };

                let lesson = Lesson::create(
                    &mm,
                    &admin,
                    LessonCreate {
                        course_id,
                        title,
                        content,
                        duration_secs: Some(duration_secs),
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add { course_id, title, passing_score } => {
                if !(0..=100).contains(&passing_score) {
                    return Err(ServiceError::bad_request(
                        ResourceType::Quiz,
                        "passing score must be within 0..=100",
                    ).into());
                }

                let quiz = Quiz::create(
                    &mm,
                    &admin,
                    QuizCreate {
                        course_id,
                        title,
                        passing_score: Some(passing_score),
                        time_limit_secs: None,
                    },
                )
                .await?;
                println!("Quiz created: {:?}", quiz);
            }

            QuizCommands::AddQuestion { quiz_id, prompt, options, correct_key, points, order_index } => {
                let data = QuestionCreate {
                    quiz_id,
                    prompt,
                    options: options.into_iter().collect::<BTreeMap<_, _>>(),
                    correct_key,
                    points: Some(points),
                    order_index: Some(order_index),
                };
                if !data.is_valid() {
                    return Err(ServiceError::bad_request(
                        ResourceType::Question,
                        "correct key must name one of the options",
                    ).into());
                }

                let question = Question::create(&mm, &admin, data).await?;
                println!("Question created: {:?}", question);
            }
        },

        Commands::Token { action } => match action {
            TokenCommands::Mint { id, email, hours } => {
                let claims = IdentityClaims {
                    sub: id.to_string(),
                    email,
                    exp: (chrono::Utc::now() + chrono::Duration::hours(hours)).timestamp(),
                    aud: config.identity().audience().map(String::from),
                };
                let token = generate_token(claims, config.identity().jwt_secret())
                    .map_err(CryptError::from)?;
                println!("{token}");
            }
        },
    }

    Ok(())
}
