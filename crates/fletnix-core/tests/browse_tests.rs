mod common;

use std::time::Duration;

use common::{session_for, show, titles_page, Fixture, EMAIL};
use fletnix_core::{PageQuery, Session, Show, TypeFilter};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_titles(fixture: &Fixture, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&fixture.server)
        .await;
}

async fn mount_watchlist(fixture: &Fixture, shows: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/titles/watchlist"))
        .and(query_param("email", EMAIL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shows": shows})))
        .mount(&fixture.server)
        .await;
}

fn watchlist_shows() -> Vec<serde_json::Value> {
    vec![
        show("s1", "The Crown", "TV Show"),
        show("s2", "Crown Heights", "Movie"),
        show("s3", "Dark", "TV Show"),
    ]
}

#[tokio::test]
async fn test_initialize_loads_first_page_and_watchlist() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("age", "21"))
        .and(query_param("type", "All"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(titles_page(
            31,
            1,
            vec![show("s10", "Ozark", "TV Show"), show("s11", "Roma", "Movie")],
        )))
        .expect(1)
        .mount(&fixture.server)
        .await;
    mount_watchlist(&fixture, vec![show("s11", "Roma", "Movie")]).await;

    let browse = fixture.browse(session_for(EMAIL, 21));
    let view = browse.initialize().await;

    assert_eq!(view.user_age, 21);
    assert_eq!(view.initial_letter, "J");
    assert_eq!(view.shows.len(), 2);
    assert_eq!(view.total_items, 31);
    assert_eq!(view.total_pages, 3);
    assert!(!view.no_results);
    assert!(!view.loading);
    assert!(view.error.is_none());
    assert!(browse.is_in_watchlist(&Show::new("s11", "Roma")));
    assert!(!browse.is_in_watchlist(&Show::new("s10", "Ozark")));
}

#[tokio::test]
async fn test_initialize_without_session_fails_soft() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("age", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(titles_page(1, 1, vec![show("s1", "A", "Movie")])))
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/titles/watchlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shows": []})))
        .expect(0)
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(Session::in_memory());
    let view = browse.initialize().await;

    assert_eq!(view.user_age, 0);
    assert_eq!(view.initial_letter, "?");
    assert_eq!(view.shows.len(), 1);
}

#[tokio::test]
async fn test_load_page_empty_result_is_not_an_error() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "1", json!({"total": 0, "data": []})).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.load_page(PageQuery::first(30, 15)).await;

    assert!(view.no_results);
    assert!(view.error.is_none());
    assert!(view.shows.is_empty());
    assert_eq!(view.total_items, 0);
    assert!(!view.loading);
}

#[tokio::test]
async fn test_load_page_failure_surfaces_server_detail() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": {"detail": "rate limited"}})),
        )
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.load_page(PageQuery::first(30, 15)).await;

    assert_eq!(view.error.as_deref(), Some("rate limited"));
    assert!(!view.no_results);
    assert!(view.shows.is_empty());
    assert!(!view.loading);
}

#[tokio::test]
async fn test_load_page_failure_without_detail_uses_fallback() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.load_page(PageQuery::first(30, 15)).await;

    assert_eq!(view.error.as_deref(), Some("Failed to load shows"));
}

#[tokio::test]
async fn test_empty_watchlist_sets_both_signals() {
    let fixture = Fixture::start().await;
    mount_watchlist(&fixture, Vec::new()).await;
    mount_titles(&fixture, "1", titles_page(1, 1, vec![show("s1", "A", "Movie")])).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.initialize().await;
    let view = browse.toggle_watchlist_view().await;

    assert!(view.showing_watchlist);
    assert!(view.shows.is_empty());
    assert!(view.no_results);
    assert_eq!(view.error.as_deref(), Some("Nothing in watchlist"));
    assert_eq!(view.total_pages, 1);
}

#[tokio::test]
async fn test_watchlist_mode_filters_locally() {
    let fixture = Fixture::start().await;
    mount_watchlist(&fixture, watchlist_shows()).await;
    mount_titles(&fixture, "1", titles_page(40, 1, vec![show("s9", "Narcos", "TV Show")])).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.initialize().await;

    let view = browse.toggle_watchlist_view().await;
    assert!(view.showing_watchlist);
    assert_eq!(view.shows.len(), 3);
    assert_eq!(view.total_pages, 1);
    let requests_before = fixture.request_count().await;

    let view = browse.search("  cROWN ").await;
    let ids: Vec<_> = view.shows.iter().map(|s| s.show_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(view.total_pages, 1);
    assert!(!view.no_results);

    let view = browse.search("zzz").await;
    assert!(view.shows.is_empty());
    assert!(view.no_results);

    let view = browse.search("").await;
    assert_eq!(view.shows.len(), 3);

    let view = browse.filter_by_type(TypeFilter::Movie).await;
    assert_eq!(view.shows.len(), 1);
    assert_eq!(view.shows[0].show_id, "s2");

    let view = browse.filter_by_type(TypeFilter::All).await;
    assert_eq!(view.shows.len(), 3);

    assert_eq!(fixture.request_count().await, requests_before);

    let view = browse.toggle_watchlist_view().await;
    assert!(!view.showing_watchlist);
    assert_eq!(view.page, 1);
    assert_eq!(view.shows[0].show_id, "s9");
    assert_eq!(view.total_pages, 3);
}

#[tokio::test]
async fn test_leaving_watchlist_reloads_page_one() {
    let fixture = Fixture::start().await;
    mount_watchlist(&fixture, watchlist_shows()).await;
    mount_titles(&fixture, "1", titles_page(40, 1, vec![show("p1", "Page One", "Movie")])).await;
    mount_titles(&fixture, "2", titles_page(40, 2, vec![show("p2", "Page Two", "Movie")])).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.initialize().await;
    let view = browse.next_page().await;
    assert_eq!(view.page, 2);

    browse.toggle_watchlist_view().await;
    let view = browse.toggle_watchlist_view().await;

    assert_eq!(view.page, 1);
    assert_eq!(view.shows[0].show_id, "p1");
}

#[tokio::test]
async fn test_empty_search_in_browse_mode_reloads_page_one() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "1", titles_page(40, 1, vec![show("p1", "Page One", "Movie")])).await;
    mount_titles(&fixture, "2", titles_page(40, 2, vec![show("p2", "Page Two", "Movie")])).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.load_page(PageQuery { page: 2, ..PageQuery::first(30, 15) }).await;

    let view = browse.search("   ").await;

    assert_eq!(view.page, 1);
    assert_eq!(view.shows[0].show_id, "p1");
    let requests = fixture.server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.url.path(), "/titles");
}

#[tokio::test]
async fn test_remote_search_normalises_term() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/title/search"))
        .and(query_param("q", "dark"))
        .and(query_param("age", "16"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 20,
            "results": [show("s3", "Dark", "TV Show")]
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    mount_titles(&fixture, "1", titles_page(1, 1, vec![show("s1", "A", "Movie")])).await;
    mount_watchlist(&fixture, Vec::new()).await;

    let browse = fixture.browse(session_for(EMAIL, 16));
    browse.initialize().await;
    let view = browse.search("  DaRk ").await;

    assert_eq!(view.search_term, "  DaRk ");
    assert_eq!(view.page, 1);
    assert_eq!(view.shows.len(), 1);
    assert_eq!(view.total_items, 20);
    assert_eq!(view.total_pages, 2);
}

#[tokio::test]
async fn test_remote_search_empty_results() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/title/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.search("nothing matches").await;

    assert!(view.no_results);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_remote_search_failure() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/title/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.search("dark").await;

    assert_eq!(view.error.as_deref(), Some("Search failed"));
    assert!(!view.no_results);
}

#[tokio::test]
async fn test_filter_by_type_reloads_from_page_one() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "2", titles_page(40, 2, vec![show("p2", "Page Two", "Movie")])).await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("type", "TV"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(titles_page(5, 1, vec![show("t1", "Dark", "TV Show")])))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.load_page(PageQuery { page: 2, ..PageQuery::first(30, 15) }).await;
    let view = browse.filter_by_type(TypeFilter::TvShow).await;

    assert_eq!(view.type_filter, TypeFilter::TvShow);
    assert_eq!(view.page, 1);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.shows[0].show_id, "t1");
}

#[tokio::test]
async fn test_paging_is_clamped() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "1", titles_page(20, 1, vec![show("p1", "Page One", "Movie")])).await;
    mount_titles(&fixture, "2", titles_page(20, 2, vec![show("p2", "Page Two", "Movie")])).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let view = browse.load_page(PageQuery::first(30, 15)).await;
    assert_eq!(view.total_pages, 2);

    let view = browse.previous_page().await;
    assert_eq!(view.page, 1);
    assert_eq!(fixture.request_count().await, 1);

    let view = browse.next_page().await;
    assert_eq!(view.page, 2);
    assert_eq!(view.shows[0].show_id, "p2");

    let view = browse.next_page().await;
    assert_eq!(view.page, 2);
    assert_eq!(fixture.request_count().await, 2);

    let view = browse.previous_page().await;
    assert_eq!(view.page, 1);
    assert_eq!(fixture.request_count().await, 3);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let fixture = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("type", "Movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(titles_page(1, 1, vec![show("slow", "Slow Movie", "Movie")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/titles"))
        .and(query_param("type", "TV"))
        .respond_with(ResponseTemplate::new(200).set_body_json(titles_page(1, 1, vec![show("fast", "Fast Show", "TV Show")])))
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    let (_, _) = tokio::join!(
        browse.filter_by_type(TypeFilter::Movie),
        browse.filter_by_type(TypeFilter::TvShow),
    );

    let view = browse.snapshot();
    assert_eq!(view.type_filter, TypeFilter::TvShow);
    assert_eq!(view.shows.len(), 1);
    assert_eq!(view.shows[0].show_id, "fast");
    assert!(!view.loading);
}

#[tokio::test]
async fn test_paging_is_ignored_in_watchlist_view() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "1", titles_page(40, 1, vec![show("p1", "Page One", "Movie")])).await;
    mount_titles(&fixture, "2", titles_page(40, 2, vec![show("p2", "Page Two", "Movie")])).await;
    mount_titles(&fixture, "3", titles_page(40, 3, vec![show("p3", "Page Three", "Movie")])).await;
    mount_watchlist(&fixture, vec![show("w1", "Watched", "Movie")]).await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.initialize().await;
    browse.next_page().await;
    let view = browse.next_page().await;
    assert_eq!(view.page, 3);

    let watching = browse.toggle_watchlist_view().await;
    assert!(watching.showing_watchlist);
    assert_eq!(watching.page, 1);
    assert_eq!(watching.total_pages, 1);
    assert_eq!(watching.shows[0].show_id, "w1");
    let requests = fixture.request_count().await;

    assert_eq!(browse.previous_page().await, watching);
    assert_eq!(browse.next_page().await, watching);
    assert_eq!(browse.load_page(PageQuery::first(30, 15)).await, watching);
    assert_eq!(fixture.request_count().await, requests);
}

#[tokio::test]
async fn test_superseded_watchlist_fetch_still_refreshes_cache() {
    let fixture = Fixture::start().await;
    mount_titles(&fixture, "1", titles_page(1, 1, vec![show("p1", "Page One", "Movie")])).await;
    Mock::given(method("GET"))
        .and(path("/titles/watchlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shows": [show("old", "Old Pick", "Movie")]})))
        .up_to_n_times(1)
        .mount(&fixture.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/titles/watchlist"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"shows": [show("new", "New Pick", "Movie")]}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&fixture.server)
        .await;

    let browse = fixture.browse(session_for(EMAIL, 30));
    browse.initialize().await;
    assert!(browse.is_in_watchlist(&Show::new("old", "Old Pick")));

    let (_, searched) = tokio::join!(browse.toggle_watchlist_view(), browse.search("pick"));
    assert!(searched.showing_watchlist);

    assert!(browse.is_in_watchlist(&Show::new("new", "New Pick")));
    assert!(!browse.is_in_watchlist(&Show::new("old", "Old Pick")));
    let view = browse.search("new").await;
    assert_eq!(view.shows.len(), 1);
    assert_eq!(view.shows[0].show_id, "new");
}
