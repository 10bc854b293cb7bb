use leptos::prelude::*;
use leptos_router::components::A;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="page not-found">
			<h1>"Page not found"</h1>
			<p>"Nothing lives at this address."</p>
			<A href="/">"Back to all papers"</A>
		</div>
	}
}
