// ABOUTME: Tests for the Catalog - registration, rename semantics, category
// ABOUTME: listing, shared state, and write-behind persistence.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::error::CatalogError;

fn issue_tool() -> Tool {
    Tool::new("jira_get_issue", "jira")
        .description("Fetch a Jira issue")
        .required_input("issue_key")
}

/// Wait for the write-behind task to catch up.
async fn wait_for_store(store: &MemoryStore, expected: usize) -> Vec<Tool> {
    for _ in 0..100 {
        let snapshot = store.snapshot().await;
        if snapshot.len() == expected {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store.snapshot().await
}

/// A store whose writes always fail.
struct BrokenStore;

#[async_trait]
impl CatalogStore for BrokenStore {
    async fn load_all(&self) -> Result<Vec<Tool>, CatalogError> {
        Err(CatalogError::Io(std::io::Error::other("disk gone")))
    }

    async fn save_all(&self, _tools: &[Tool]) -> Result<(), CatalogError> {
        Err(CatalogError::Io(std::io::Error::other("disk gone")))
    }
}

#[tokio::test]
async fn test_register_and_lookup() {
    let catalog = Catalog::new();
    catalog.register(issue_tool()).await.unwrap();

    let tool = catalog.lookup("jira_get_issue").await;
    assert_eq!(tool, Some(issue_tool()));
    assert!(catalog.exists("jira_get_issue").await);
}

#[tokio::test]
async fn test_lookup_nonexistent() {
    let catalog = Catalog::new();
    assert!(catalog.lookup("nonexistent").await.is_none());
    assert!(!catalog.exists("nonexistent").await);
}

#[tokio::test]
async fn test_register_overwrites_by_name() {
    let catalog = Catalog::new();
    catalog.register(issue_tool()).await.unwrap();
    catalog
        .register(Tool::new("jira_get_issue", "jira").description("v2"))
        .await
        .unwrap();

    assert_eq!(catalog.count().await, 1);
    assert_eq!(
        catalog.lookup("jira_get_issue").await.unwrap().description,
        "v2"
    );
}

#[tokio::test]
async fn test_register_rejects_invalid() {
    let catalog = Catalog::new();
    let result = catalog.register(Tool::new("", "jira")).await;
    assert!(matches!(result, Err(CatalogError::Invalid(_))));

    let result = catalog.register(Tool::new("orphan", " ")).await;
    assert!(matches!(result, Err(CatalogError::Invalid(_))));
    assert_eq!(catalog.count().await, 0);
}

#[tokio::test]
async fn test_remove() {
    let catalog = Catalog::new();
    catalog.register(issue_tool()).await.unwrap();

    assert!(catalog.remove("jira_get_issue").await);
    assert!(!catalog.remove("jira_get_issue").await);
    assert_eq!(catalog.count().await, 0);
}

#[tokio::test]
async fn test_update_in_place() {
    let catalog = Catalog::new();
    catalog.register(issue_tool()).await.unwrap();

    let updated = issue_tool().capability("read");
    catalog.update("jira_get_issue", updated.clone()).await.unwrap();

    assert_eq!(catalog.lookup("jira_get_issue").await, Some(updated));
}

#[tokio::test]
async fn test_update_with_rename() {
    let catalog = Catalog::new();
    catalog.register(issue_tool()).await.unwrap();

    let renamed = Tool::new("jira_issue_details", "jira");
    catalog.update("jira_get_issue", renamed).await.unwrap();

    assert!(!catalog.exists("jira_get_issue").await);
    assert!(catalog.exists("jira_issue_details").await);
    assert_eq!(catalog.count().await, 1);
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    let catalog = Catalog::new();
    let result = catalog.update("ghost", issue_tool()).await;
    assert!(matches!(result, Err(CatalogError::NotFound(name)) if name == "ghost"));
    assert_eq!(catalog.count().await, 0);
}

#[tokio::test]
async fn test_list_by_category_and_categories() {
    let catalog = Catalog::new();
    catalog
        .register_all(vec![
            Tool::new("b_search", "jira"),
            Tool::new("a_issue", "jira"),
            Tool::new("pages", "confluence"),
        ])
        .await
        .unwrap();

    let jira: Vec<_> = catalog
        .list_by_category("jira")
        .await
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(jira, vec!["a_issue", "b_search"]);
    assert!(catalog.list_by_category("webex").await.is_empty());
    assert_eq!(catalog.categories().await, vec!["confluence", "jira"]);
    assert_eq!(catalog.list_all().await.len(), 3);
}

#[tokio::test]
async fn test_clone_shares_state() {
    let catalog = Catalog::new();
    let clone = catalog.clone();

    catalog.register(issue_tool()).await.unwrap();
    assert_eq!(clone.count().await, 1);
}

#[tokio::test]
async fn test_concurrent_registration() {
    let catalog = Catalog::new();
    let mut handles = Vec::new();
    for i in 0..32 {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .register(Tool::new(format!("tool_{}", i), "jira"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(catalog.count().await, 32);
}

#[tokio::test]
async fn test_load_from_store() {
    let store = Arc::new(MemoryStore::with_tools(vec![
        issue_tool(),
        Tool::new("", "jira"),
    ]));
    let catalog = Catalog::with_store(store);

    // The invalid entry is skipped and not counted
    let loaded = catalog.load_from_store().await.unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(catalog.count().await, 1);
}

#[tokio::test]
async fn test_load_without_store() {
    let catalog = Catalog::new();
    assert_eq!(catalog.load_from_store().await.unwrap(), 0);
}

#[tokio::test]
async fn test_mutations_write_behind() {
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::with_store(store.clone());

    catalog.register(issue_tool()).await.unwrap();
    catalog.register(Tool::new("wiki_search", "confluence")).await.unwrap();
    let saved = wait_for_store(&store, 2).await;
    assert_eq!(saved.len(), 2);

    catalog.remove("wiki_search").await;
    let saved = wait_for_store(&store, 1).await;
    assert_eq!(saved, vec![issue_tool()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutations_persist_latest_state() {
    let store = Arc::new(MemoryStore::new());
    let catalog = Catalog::with_store(store.clone());

    let mut handles = vec![];
    for i in 0..32 {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            let name = format!("tool_{}", i);
            catalog.register(Tool::new(name.clone(), "jira")).await.unwrap();
            if i % 2 == 0 {
                catalog.remove(&name).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let expected = catalog.list_all().await;
    assert_eq!(expected.len(), 16);
    // Intermediate states can also hold 16 tools, so wait for an exact match
    for _ in 0..100 {
        if store.snapshot().await == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.snapshot().await, expected);
}

#[tokio::test]
async fn test_store_failure_does_not_fail_mutation() {
    let catalog = Catalog::with_store(Arc::new(BrokenStore));

    catalog.register(issue_tool()).await.unwrap();
    assert!(catalog.remove("jira_get_issue").await);

    // Explicit persistence does report the failure
    assert!(catalog.persist_now().await.is_err());
}
