use items_framework::{
    ApiRequest, BelongsTo, Condition, FilterParams, FilterScope, HasMany, ItemResponse, ItemsError,
    ItemsPage, ItemsService, Loaded, Model, ModelStore, Query, RelationSpec, Relations,
    ResourceConfig, ResourceContext, ResourceService, StoreClient, StoreError,
};
use serde::Serialize;
use serde_json::{json, Value};

// --- Test Models ---

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Author {
    id: u32,
    name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Article {
    id: u32,
    author_id: u32,
    title: String,
    published: bool,
    archived_at: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Comment {
    id: u32,
    article_id: u32,
    body: String,
}

#[derive(Debug)]
struct ArticleCreate {
    author_id: u32,
    title: String,
    published: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid record: {0}")]
struct Invalid(&'static str);

impl Model for Author {
    type Id = u32;
    type Create = String;
    type Update = String;
    type Error = Invalid;

    fn id(&self) -> &u32 {
        &self.id
    }
    fn from_create_params(id: u32, name: String) -> Result<Self, Invalid> {
        Ok(Self { id, name })
    }
    fn apply_update(&mut self, name: String) -> Result<(), Invalid> {
        self.name = name;
        Ok(())
    }
}

impl Model for Article {
    type Id = u32;
    type Create = ArticleCreate;
    type Update = Option<u64>;
    type Error = Invalid;

    fn id(&self) -> &u32 {
        &self.id
    }
    fn from_create_params(id: u32, params: ArticleCreate) -> Result<Self, Invalid> {
        if params.title.is_empty() {
            return Err(Invalid("title"));
        }
        Ok(Self {
            id,
            author_id: params.author_id,
            title: params.title,
            published: params.published,
            archived_at: None,
        })
    }
    fn apply_update(&mut self, archived_at: Option<u64>) -> Result<(), Invalid> {
        self.archived_at = archived_at;
        Ok(())
    }
}

impl FilterScope for Article {
    fn filter_and_relations_and_sort(request: &ApiRequest, params: &FilterParams) -> Query<Self> {
        let mut query = Query::new()
            .filter_from(request, params, &["author_id", "published"])
            .sort_from(request, &["title", "id"]);
        if let Some(term) = request.get("q") {
            query = query.filter(Condition::like("title", format!("%{term}%")));
        }
        query
    }
}

impl Model for Comment {
    type Id = u32;
    type Create = (u32, String);
    type Update = String;
    type Error = Invalid;

    fn id(&self) -> &u32 {
        &self.id
    }
    fn from_create_params(id: u32, (article_id, body): (u32, String)) -> Result<Self, Invalid> {
        Ok(Self { id, article_id, body })
    }
    fn apply_update(&mut self, body: String) -> Result<(), Invalid> {
        self.body = body;
        Ok(())
    }
}

// --- Custom service with a base scope ---

struct ArticleService {
    context: ResourceContext<Article>,
    store: StoreClient<Article>,
}

impl ItemsService<Article> for ArticleService {
    fn context(&self) -> &ResourceContext<Article> {
        &self.context
    }

    fn store(&self) -> &StoreClient<Article> {
        &self.store
    }

    fn base_query_filter(&self, query: Query<Article>) -> Query<Article> {
        query.where_null("archived_at")
    }
}

struct Fixture {
    articles: StoreClient<Article>,
    service: ArticleService,
}

async fn fixture(context: ResourceContext<Article>) -> Fixture {
    let (author_store, authors) = ModelStore::<Author>::new(16);
    let (comment_store, comments) = ModelStore::<Comment>::new(16);
    let (article_store, articles) = ModelStore::<Article>::new(16);

    tokio::spawn(author_store.run(Relations::none()));
    tokio::spawn(comment_store.run(Relations::none()));
    tokio::spawn(
        article_store.run(
            Relations::none()
                .register("author", BelongsTo::new(authors.clone(), |a: &Article| Some(a.author_id)))
                .register(
                    "comments",
                    HasMany::new(comments.clone(), "article_id", |a: &Article| json!(a.id)),
                ),
        ),
    );

    authors.insert("Ada".into()).await.unwrap();
    authors.insert("Grace".into()).await.unwrap();

    let seed = [
        (1, "Rust ownership", true),
        (2, "Compilers", true),
        (1, "Draft notes", false),
        (2, "Rust traits", true),
    ];
    for (author_id, title, published) in seed {
        articles
            .insert(ArticleCreate {
                author_id,
                title: title.to_string(),
                published,
            })
            .await
            .unwrap();
    }
    comments.insert((1, "Great".into())).await.unwrap();
    comments.insert((1, "Thanks".into())).await.unwrap();

    // archive "Compilers"
    articles.update(2, Some(1_700_000_000)).await.unwrap();

    Fixture {
        articles: articles.clone(),
        service: ArticleService {
            context,
            store: articles,
        },
    }
}

fn index(uri: &str) -> ApiRequest {
    ApiRequest::from_uri(uri)
        .unwrap()
        .with_route("ArticleController@index")
}

fn titles(page: &Value) -> Vec<&str> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_applies_filter_scope_base_scope_and_sort() {
    let fx = fixture(ResourceContext::new().with_filter_scope()).await;
    assert!(fx.service.supports_filter());

    let page = fx
        .service
        .get_items(&index("/articles?published=1&sort=-title"), &FilterParams::new(), true)
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(titles(&page), vec!["Rust traits", "Rust ownership"]);
    assert_eq!(page["total"], 2);
    assert_eq!(page["per_page"], 10);
    assert_eq!(
        page["first_page_url"],
        "/articles?page=1&published=1&sort=-title"
    );
}

#[tokio::test]
async fn test_explicit_params_win_over_request() {
    let fx = fixture(ResourceContext::new().with_filter_scope()).await;
    let mut params = FilterParams::new();
    params.insert("author_id".into(), "1".into());

    let page = fx
        .service
        .get_items(&index("/articles?author_id=2&q=rust"), &params, true)
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(titles(&page), vec!["Rust ownership"]);
}

#[tokio::test]
async fn test_pagination_links_and_unpaginated_listing() {
    let fx = fixture(ResourceContext::new()).await;

    let page = fx
        .service
        .get_items(&index("/articles?limit=2&page=2"), &FilterParams::new(), true)
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(titles(&page), vec!["Rust traits"]);
    assert_eq!(page["current_page"], 2);
    assert_eq!(page["last_page"], 2);
    assert_eq!(page["prev_page_url"], "/articles?limit=2&page=1");
    assert_eq!(page["next_page_url"], Value::Null);

    let all = fx
        .service
        .get_items(&index("/articles"), &FilterParams::new(), false)
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(all["total"], 3);
    assert_eq!(all["per_page"], 3);
    assert_eq!(all["last_page"], 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty_and_store_survives() {
    let fx = fixture(ResourceContext::new()).await;

    for uri in [
        "/articles?page=18446744073709551615",
        "/articles?page=2&limit=18446744073709551615",
    ] {
        let page = fx
            .service
            .get_items(&index(uri), &FilterParams::new(), true)
            .await
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(page["data"], json!([]));
        assert_eq!(page["total"], 3);
        assert_eq!(page["from"], Value::Null);
        assert_eq!(page["next_page_url"], Value::Null);
    }

    let page = fx
        .service
        .get_items(&index("/articles"), &FilterParams::new(), true)
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(titles(&page).len(), 3);
}

#[tokio::test]
async fn test_per_action_relations_and_expand() {
    let context = ResourceContext::new()
        .with_relations(RelationSpec::per_action([("show", ["comments"])]))
        .with_transformer(|article: &Loaded<Article>, _: &ApiRequest| {
            json!({
                "title": article.record.title,
                "comments": article.relation("comments").cloned().unwrap_or(Value::Null),
                "author": article.relation("author").and_then(|a| a.get("name")).cloned(),
            })
        });
    let fx = fixture(context).await;

    let show = ApiRequest::new("/articles/1").with_route("ArticleController@show");
    let item = fx
        .service
        .get_item(1, &show, &FilterParams::new(), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.data().unwrap()["comments"].as_array().unwrap().len(), 2);
    assert_eq!(item.data().unwrap()["author"], Value::Null);

    let page = fx
        .service
        .get_items(&index("/articles?expand=author&limit=1"), &FilterParams::new(), true)
        .await
        .unwrap();
    let ItemsPage::Transformed(page) = page else {
        panic!("transformer configured");
    };
    // `index` has no entry of its own, so it loads every configured relation
    assert_eq!(page.data[0]["author"], "Ada");
    assert_eq!(page.data[0]["comments"].as_array().unwrap().len(), 2);
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.links.next.as_deref(), Some("/articles?expand=author&limit=1&page=2"));
}

#[tokio::test]
async fn test_item_lookup_paths() {
    let fx = fixture(ResourceContext::new().with_filter_scope()).await;
    let show = ApiRequest::new("/articles/2").with_route("ArticleController@show");

    // no relations: direct lookup, the archive scope does not apply
    let item = fx
        .service
        .get_item(2, &show, &FilterParams::new(), true)
        .await
        .unwrap();
    assert!(matches!(item, Some(ItemResponse::Envelope(_))));

    // relation-aware lookup goes through the scoped query
    let expanded = show.clone().with_query("expand", "author");
    let item = fx
        .service
        .get_item(2, &expanded, &FilterParams::new(), true)
        .await
        .unwrap();
    assert!(item.is_none());

    let missing = fx
        .service
        .get_item(99, &show, &FilterParams::new(), true)
        .await
        .unwrap();
    assert!(missing.is_none());

    let destroy = ApiRequest::new("/articles/3")
        .with_route("ArticleController@destroy")
        .with_query("expand", "author");
    let bare = fx
        .service
        .get_item(3, &destroy, &FilterParams::new(), true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bare, ItemResponse::Bare(serde_json::to_value(Loaded::new(Article {
        id: 3,
        author_id: 1,
        title: "Draft notes".into(),
        published: false,
        archived_at: None,
    })).unwrap()));
}

#[tokio::test]
async fn test_store_errors_propagate_through_the_resolver() {
    let fx = fixture(ResourceContext::new()).await;

    let unknown = fx
        .service
        .get_items(&index("/articles?expand=tags"), &FilterParams::new(), true)
        .await;
    assert!(matches!(
        unknown,
        Err(ItemsError::Store(StoreError::UnknownRelation { .. }))
    ));

    let invalid = fx
        .service
        .get_items(
            &ApiRequest::new("/articles").with_route("ArticleController"),
            &FilterParams::new(),
            true,
        )
        .await;
    assert!(matches!(invalid, Err(ItemsError::InvalidRoute(_))));

    let rejected = fx
        .articles
        .insert(ArticleCreate {
            author_id: 1,
            title: String::new(),
            published: false,
        })
        .await;
    assert!(matches!(rejected, Err(StoreError::Model(_))));
}

#[tokio::test]
async fn test_config_driven_resource() {
    let config: ResourceConfig =
        serde_json::from_value(json!({ "relations": ["author"], "default_page_size": 2 })).unwrap();
    let (store, articles) = ModelStore::<Article>::new(8);
    let (author_store, authors) = ModelStore::<Author>::new(8);
    tokio::spawn(author_store.run(Relations::none()));
    tokio::spawn(store.run(
        Relations::none().register("author", BelongsTo::new(authors.clone(), |a: &Article| Some(a.author_id))),
    ));
    authors.insert("Ada".into()).await.unwrap();
    for title in ["One", "Two", "Three"] {
        articles
            .insert(ArticleCreate {
                author_id: 1,
                title: title.into(),
                published: true,
            })
            .await
            .unwrap();
    }

    let service = ResourceService::new(ResourceContext::from_config(config), articles);
    let page = service
        .get_items(&index("/articles"), &FilterParams::new(), true)
        .await
        .unwrap()
        .into_value()
        .unwrap();

    assert_eq!(page["per_page"], 2);
    assert_eq!(page["data"][0]["author"]["name"], "Ada");
    assert_eq!(page["last_page"], 2);
}
