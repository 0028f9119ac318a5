use api_resource_loader::lifecycle::tracing::setup_tracing;
use resource_sample::lifecycle::BlogSystem;
use serde_json::{json, Value};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting blog API sample");

    let system = BlogSystem::new();

    let span = tracing::info_span!("author_creation");
    let author = async {
        info!("Creating author");
        system
            .create("authors", attributes(json!({ "name": "Ada", "email": "ada@example.com" })))
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    let author_id = author.get("id").cloned().unwrap_or(Value::Null);
    info!(%author_id, "Author created");

    let span = tracing::info_span!("post_publishing");
    let post_ids = async {
        let mut ids = Vec::new();
        for title in ["Resolving Resources", "Draft Thoughts"] {
            let post = system
                .create(
                    "blog-posts",
                    attributes(json!({
                        "author_id": author_id,
                        "title": title,
                        "body": "...",
                        "internal_notes": "not for readers",
                    })),
                )
                .await
                .map_err(|e| e.to_string())?;
            info!(slug = ?post.get("slug"), "Post created");
            ids.push(post.get("id").cloned().unwrap_or(Value::Null));
        }
        Ok::<_, String>(ids)
    }
    .instrument(span)
    .await?;

    if let Some(draft) = post_ids.last() {
        system
            .delete("blog-posts", draft.clone())
            .await
            .map_err(|e| e.to_string())?;
        info!(id = %draft, "Post soft-deleted");
    }

    let posts = system.list("blog-posts").await.map_err(|e| e.to_string())?;
    info!(visible = posts.len(), "Posts listed");

    for endpoint in ["blog-posts", "stats"] {
        match system.resource(endpoint) {
            Ok(resource) => {
                let descriptor = serde_json::to_string_pretty(&resource.describe())
                    .map_err(|e| e.to_string())?;
                println!("{descriptor}");
            }
            Err(e) => warn!(%endpoint, error = %e, "Describe failed"),
        }
    }

    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Sample completed successfully");
    Ok(())
}

fn attributes(value: Value) -> api_resource_loader::Attributes {
    match value {
        Value::Object(map) => map,
        _ => Default::default(),
    }
}
