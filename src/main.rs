mod api;
mod app;
mod bridge;
mod cascade;
mod config;
mod controller;
mod error;
mod models;
mod notify;
mod render;
mod upload;
mod validate;

use app::*;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    bridge::install();
    mount_to_body(|| {
        view! {
            <App/>
        }
    })
}
