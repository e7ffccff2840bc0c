use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{
    AccessPolicy, CredentialAuthenticator, PasswordHasher, RequestAuthorizer, SessionIssuer,
    TokenCodec,
};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::middleware::{BearerAuth, RequestLogger};
use crate::routes::{
    get_current_user, health_check, login, refresh, register, set_user_status,
    update_current_user,
};
use crate::store::UserStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
    password_config: PasswordSettings,
) -> Result<Server, std::io::Error> {
    // Auth core, built once from immutable settings
    let hasher = PasswordHasher::new(password_config);
    let codec = TokenCodec::new(&jwt_config);
    let issuer = SessionIssuer::new(
        CredentialAuthenticator::new(store.clone(), hasher),
        codec.clone(),
        store.clone(),
        jwt_config.access_token_ttl(),
    );
    let authorizer = Arc::new(RequestAuthorizer::new(codec, store.clone()));

    let store_data: web::Data<dyn UserStore> = web::Data::from(store);
    let hasher_data = web::Data::new(hasher);
    let issuer_data = web::Data::new(issuer);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(store_data.clone())
            .app_data(hasher_data.clone())
            .app_data(issuer_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/auth")
                            // Public routes
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login))
                            .route("/refresh", web::post().to(refresh))
                            // Active account required
                            .service(
                                web::resource("/me")
                                    .wrap(BearerAuth::new(
                                        authorizer.clone(),
                                        AccessPolicy::ACTIVE,
                                    ))
                                    .route(web::get().to(get_current_user))
                                    .route(web::patch().to(update_current_user)),
                            ),
                    )
                    // Superuser required
                    .service(
                        web::scope("/users")
                            .wrap(BearerAuth::new(authorizer.clone(), AccessPolicy::SUPERUSER))
                            .route("/{email}/status", web::put().to(set_user_status)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
