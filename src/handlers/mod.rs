pub mod analysis;
pub mod dashboard;
pub mod health;

use actix_web::web;

use crate::services::stock::PriceSource;

pub fn config<S: PriceSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.configure(dashboard::config::<S>).service(
        web::scope("/api/v1")
            .configure(health::config::<S>)
            .configure(analysis::config::<S>),
    );
}
