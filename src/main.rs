use dotenvy::dotenv;
use pisces::config::AppConfig;
use pisces::domain::user::NewUser;
use pisces::state::AppState;
use pisces::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()?;
    log::info!("Starting pisces in {:?} mode", config.env);

    let pool = create_pool(&config.database_url)?;
    run_migrations(&pool)?;

    let state = AppState::from_config(pool, &config);

    if let Some(seed) = &config.admin {
        let created = state.auth.ensure_admin(
            NewUser {
                username: seed.username.clone(),
                email: seed.email.clone(),
                admin: true,
            },
            &seed.password,
        )?;
        if created {
            log::info!("Created admin account {}", seed.username);
        } else {
            log::info!("Admin account {} already exists", seed.username);
        }
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await?;
    Ok(())
}
