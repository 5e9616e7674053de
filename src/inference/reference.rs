// ABOUTME: Call-shape reference text per category, handed to the argument
// ABOUTME: generator so it produces calls the remote servers accept.

const JIRA: &str = r#"Jira REST API v2. Generic calls use {"endpoint", "method", "params"?, "body"?}.
- Get issue: {"endpoint": "/rest/api/2/issue/PROJ-1", "method": "GET"}
- Search: {"endpoint": "/rest/api/2/search", "method": "GET", "params": {"jql": "project = PROJ ORDER BY updated DESC", "maxResults": 50}}
- Comment: {"endpoint": "/rest/api/2/issue/PROJ-1/comment", "method": "POST", "body": {"body": "text"}}
- Update field: {"endpoint": "/rest/api/2/issue/PROJ-1", "method": "PUT", "body": {"fields": {"summary": "text"}}}
- Assign: {"endpoint": "/rest/api/2/issue/PROJ-1/assignee", "method": "PUT", "body": {"name": "user"}}
- Transitions: {"endpoint": "/rest/api/2/issue/PROJ-1/transitions", "method": "GET"}
Typed tools take {"issue_key"}, {"jql", "max_results"}, {"issue_key", "comment"}."#;

const CONFLUENCE: &str = r#"Confluence REST API. Generic calls use {"endpoint", "method", "params"?, "body"?}.
- Get page: {"endpoint": "/rest/api/content/12345", "method": "GET", "params": {"expand": "body.storage,version"}}
- Search: {"endpoint": "/rest/api/content/search", "method": "GET", "params": {"cql": "type = page AND text ~ \"term\"", "limit": 25}}
Typed tools take {"page_id"} or {"cql", "limit"}."#;

const GITHUB: &str = r#"GitHub REST API. Generic calls use {"endpoint", "method", "params"?, "body"?}.
- Repository: {"endpoint": "/repos/OWNER/REPO", "method": "GET"}
- Issue: {"endpoint": "/repos/OWNER/REPO/issues/1", "method": "GET"}
- Pull request: {"endpoint": "/repos/OWNER/REPO/pulls/1", "method": "GET"}
- Listings: {"endpoint": "/repos/OWNER/REPO/issues", "method": "GET", "params": {"per_page": 30}}
- Search: {"endpoint": "/search/issues", "method": "GET", "params": {"q": "terms", "per_page": 30}}
Typed tools take {"owner", "repo", "issue_number"|"pull_number"} or {"query", "per_page"}."#;

const WEBEX: &str = r#"Webex REST API. Generic calls use {"endpoint", "method", "params"?, "body"?}.
- Send message: {"endpoint": "/v1/messages", "method": "POST", "body": {"roomId": "ROOM", "text": "hello"}}
- Rooms: {"endpoint": "/v1/rooms", "method": "GET", "params": {"max": 50}}
- Messages: {"endpoint": "/v1/messages", "method": "GET", "params": {"roomId": "ROOM", "max": 50}}
Typed tools take {"room", "text"} or {"room", "max"}."#;

const GENERIC: &str = r#"Unknown tool server. Pass the request as {"query": "free text"} unless the tool description names its parameters."#;

/// Reference of valid call shapes for a category.
pub fn call_shape_reference(category: &str) -> &'static str {
    match category {
        "jira" => JIRA,
        "confluence" => CONFLUENCE,
        "github" => GITHUB,
        "webex" => WEBEX,
        _ => GENERIC,
    }
}
