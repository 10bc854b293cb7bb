use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::knowledge_graph::{KnowledgeGraphCanvas, NodeDetail, build};
use crate::data::Dataset;

/// Dashboard: searchable publication list beside the full knowledge graph.
#[component]
pub fn Home() -> impl IntoView {
	let dataset = use_context::<Dataset>().unwrap_or_default();
	let (query, set_query) = signal(String::new());
	let (selected, set_selected) = signal(None::<NodeDetail>);

	let records = dataset.records.clone();
	let graph_data = Memo::new(move |_| build(&records));
	let on_select = Callback::new(move |detail: NodeDetail| set_selected.set(Some(detail)));

	let list_dataset = dataset.clone();
	let result_list = move || {
		let hits = list_dataset.search(&query.get());
		if hits.is_empty() {
			return view! { <p class="empty">"No papers match this search."</p> }.into_any();
		}
		hits.into_iter()
			.map(|(index, record)| {
				let title = record.usable_title().unwrap_or("Untitled").to_string();
				let author = record.author.clone().unwrap_or_default();
				let summary = record.summary.clone().unwrap_or_default();
				view! {
					<li class="paper-card">
						<A href=format!("/paper/{index}")>
							<h2>{title}</h2>
						</A>
						<p class="paper-author">{author}</p>
						<p class="paper-abstract">{summary}</p>
					</li>
				}
			})
			.collect_view()
			.into_any()
	};

	let topics = dataset
		.top_topics(8)
		.into_iter()
		.map(|(topic, count)| {
			let label = topic.clone();
			view! {
				<button class="chip" on:click=move |_| set_query.set(topic.clone())>
					{label}
					<span class="chip-count">{count}</span>
				</button>
			}
		})
		.collect_view();

	let panel_dataset = dataset.clone();
	let selected_panel = move || {
		selected.get().map(|detail| {
			let paper = detail.record.as_ref().and_then(|record| {
				panel_dataset
					.records
					.iter()
					.position(|r| Arc::ptr_eq(r, record))
			});
			view! {
				<aside class="selected-panel">
					<span class="selected-kind">{detail.kind.name()}</span>
					<h3>{detail.label.clone()}</h3>
					<p>{format!("{} connections", detail.connections)}</p>
					{paper.map(|index| view! { <A href=format!("/paper/{index}")>"Open paper"</A> })}
					<button on:click=move |_| set_selected.set(None)>"Close"</button>
				</aside>
			}
		})
	};

	view! {
		<div class="page dashboard">
			<section class="paper-list">
				<h1>"Research Papers"</h1>
				<p class="subtitle">{format!("{} publications", dataset.len())}</p>
				<div class="search-bar">
					<input
						type="search"
						placeholder="Search titles, authors, topics"
						prop:value=query
						on:input=move |ev| set_query.set(event_target_value(&ev))
					/>
					<Show when=move || !query.read().is_empty()>
						<button class="clear" on:click=move |_| set_query.set(String::new())>
							"Clear"
						</button>
					</Show>
				</div>
				<div class="chips">{topics}</div>
				<ul class="papers">{result_list}</ul>
			</section>
			<section class="graph-panel">
				<KnowledgeGraphCanvas data=graph_data on_select=on_select />
				{selected_panel}
				<p class="hint">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
			</section>
		</div>
	}
}
