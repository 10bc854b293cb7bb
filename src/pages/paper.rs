use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::components::knowledge_graph::builder::parse_tags;
use crate::components::knowledge_graph::config::BuilderOptions;
use crate::components::knowledge_graph::{GraphScope, KnowledgeGraphCanvas, build_scoped};
use crate::data::Dataset;
use crate::pages::not_found::NotFound;

fn chips(text: Option<&str>) -> impl IntoView {
	parse_tags(text.unwrap_or_default())
		.into_iter()
		.map(|tag| view! { <span class="chip">{tag}</span> })
		.collect_view()
}

/// One publication with its metadata and the part of the graph around it.
#[component]
pub fn Paper() -> impl IntoView {
	let dataset = use_context::<Dataset>().unwrap_or_default();
	let params = use_params_map();
	let (show_graph, set_show_graph) = signal(true);

	move || {
		let index = params
			.read()
			.get("index")
			.and_then(|i| i.parse::<usize>().ok());
		let Some(record) = index.and_then(|i| dataset.get(i).cloned()) else {
			return view! { <NotFound /> }.into_any();
		};

		let title = record.usable_title().unwrap_or("Untitled").to_string();
		let records = dataset.records.clone();
		let scope = GraphScope::Neighborhood(title.clone());
		let graph_data = Memo::new(move |_| build_scoped(&records, &scope, &BuilderOptions::default()));
		let focus = graph_data
			.with_untracked(|graph| graph.node_for_record(&record).map(|node| node.id.clone()));

		let extra: Vec<(String, String)> = record
			.extra
			.keys()
			.filter_map(|key| Some((key.clone(), record.display_field(key)?)))
			.collect();

		view! {
			<article class="page paper">
				<A href="/">"← All papers"</A>
				<h1>{title}</h1>
				<p class="paper-author">{record.author.clone().unwrap_or_default()}</p>
				{record
					.link
					.clone()
					.map(|link| {
						view! {
							<a href=link.clone() target="_blank" rel="noopener">
								{link.clone()}
							</a>
						}
					})}
				<div class="chips topics">{chips(record.topic.as_deref())}</div>
				<div class="chips keywords">{chips(record.keywords.as_deref())}</div>
				<dl class="paper-meta">
					{extra
						.into_iter()
						.map(|(key, value)| view! { <dt>{key}</dt><dd>{value}</dd> })
						.collect_view()}
				</dl>
				<h2>"Abstract"</h2>
				<p class="paper-abstract">
					{record.summary.clone().unwrap_or_else(|| "No abstract available.".to_string())}
				</p>
				<button on:click=move |_| set_show_graph.update(|shown| *shown = !*shown)>
					{move || if show_graph.get() { "Hide graph" } else { "Show graph" }}
				</button>
				<Show when=move || show_graph.get()>
					<section class="graph-panel">
						<KnowledgeGraphCanvas data=graph_data focus=focus.clone() />
					</section>
				</Show>
			</article>
		}
		.into_any()
	}
}
