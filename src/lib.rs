use actix_web::{web, HttpResponse};

pub mod auth;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod posts;
pub mod users;

async fn index() -> HttpResponse {
    HttpResponse::Ok().json("Hello world!")
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/signup", web::post().to(auth::signup))
        .route("/signin", web::post().to(auth::signin))
        .route("/users", web::get().to(users::list_users))
        .service(
            web::resource("/users/{id}")
                .route(web::get().to(users::get_user))
                .route(web::post().to(follow::toggle_follow)),
        )
        .service(
            web::resource("/users/{id}/posts")
                .route(web::post().to(posts::create_post))
                .route(web::get().to(posts::list_posts)),
        )
        .route("/posts/{id}/like", web::post().to(posts::toggle_like));
}
