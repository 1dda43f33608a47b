//! Compound opposition graphs from KEGG-style reaction equations.
//!
//! [`pipeline`] turns reaction rows and a compound name table into a
//! [`GraphModel`]; [`components::force_graph`] lays that graph out with a
//! force simulation and draws it on a canvas with drag, pan and zoom.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod components;
pub mod error;
pub mod pipeline;
mod pages;

pub use components::force_graph::{
	ForceGraphCanvas, GraphEdge, GraphModel, GraphNode, LayoutConfig, Simulation, ViewportConfig,
};
pub use error::{Error, Result};

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the reaction graph and handles 404's
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Reaction graph" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
