use futures::io::Cursor;
use leptos::prelude::*;
use log::error;

use crate::components::force_graph::{ForceGraphCanvas, GraphModel};
use crate::pipeline;

const COMPOUNDS: &str = include_str!("../../data/compounds.tsv");
const REACTIONS: &str = include_str!("../../data/reactions.tsv");

async fn sample_graph() -> Result<GraphModel, String> {
	pipeline::from_sources(Cursor::new(COMPOUNDS), Cursor::new(REACTIONS))
		.await
		.map(|out| out.model)
		.map_err(|err| {
			error!("cannot build sample graph: {err}");
			err.to_string()
		})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = LocalResource::new(sample_graph);

	view! {
		<div class="fullscreen-graph">
			{move || match graph.get() {
				None => view! { <p class="status">"Loading reactions..."</p> }.into_any(),
				Some(Ok(model)) => {
					view! { <ForceGraphCanvas data=Signal::stored(model) fullscreen=true /> }
						.into_any()
				}
				Some(Err(err)) => {
					view! { <p class="status error">"Could not build the graph: " {err}</p> }
						.into_any()
				}
			}}
			<div class="graph-overlay">
				<h1>"Compound opposition graph"</h1>
				<p class="subtitle">
					"Compounds on opposite sides of a reaction are linked. Drag nodes to pin them while held. Scroll to zoom. Drag background to pan."
				</p>
			</div>
		</div>
	}
}
