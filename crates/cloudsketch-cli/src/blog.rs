//! The MyBlog-AWS architecture diagrams.
//!
//! Two views of the same serverless stack: an [`overview`] of the CDN, API,
//! Lambda functions and the stateful resources behind them, and a
//! [`details`] view adding endpoints, function sizing and data operations.

use cloudsketch::semantic::{Diagram, DiagramBuilder, Direction, Link, NodeKind};

use crate::args::Selection;

/// Both diagrams, in render order.
pub fn all() -> Vec<Diagram> {
    vec![overview(), details()]
}

/// The diagrams picked by `selection`; all of them when `None`.
pub fn select(selection: Option<Selection>) -> Vec<Diagram> {
    match selection {
        None => all(),
        Some(Selection::Overview) => vec![overview()],
        Some(Selection::Details) => vec![details()],
    }
}

/// High-level view: who talks to what.
pub fn overview() -> Diagram {
    DiagramBuilder::new("MyBlog-AWS Architecture Overview")
        .file_stem("architecture_overview")
        .direction(Direction::TopToBottom)
        .build(|canvas| {
            let users = canvas.node(NodeKind::Users, "General Users");
            let admin = canvas.node(NodeKind::User, "Admin");

            let (cf_web, cf_media) = canvas.cluster("CDN Layer", |canvas| {
                (
                    canvas.node(NodeKind::Cdn, "CloudFront\n(Frontend)"),
                    canvas.node(NodeKind::Cdn, "CloudFront\n(Media)"),
                )
            });

            let (s3_web, api, functions) = canvas.cluster("AppStack (Stateless)", |canvas| {
                let s3_web = canvas.node(NodeKind::Storage, "S3 Bucket\n(Frontend)");
                let api = canvas.node(NodeKind::Api, "API Gateway\nREST API");
                let functions = canvas.cluster("Lambda Functions", |canvas| {
                    [
                        "get-posts",
                        "get-post",
                        "create-post",
                        "update-post",
                        "delete-post",
                        "generate-presigned-url",
                    ]
                    .map(|name| canvas.node(NodeKind::Compute, name))
                });
                (s3_web, api, functions)
            });
            let [get_posts, get_post, create, update, delete, presigned] = functions;

            let (dynamodb, s3_media, cognito) = canvas.cluster("DataStack (Stateful)", |canvas| {
                (
                    canvas.node(NodeKind::Database, "DynamoDB\nBlogTable"),
                    canvas.node(NodeKind::Storage, "S3 Bucket\n(Media)"),
                    canvas.node(NodeKind::Identity, "Cognito\nUser Pool"),
                )
            });

            canvas.path(users).to(cf_web).to(s3_web);
            canvas.connect(users, api);
            canvas.connect_with(admin, api, Link::labeled("JWT"));
            canvas.connect(admin, cognito);

            canvas.connect(cf_media, s3_media);

            canvas.fan_out(api, &functions, Link::new());

            canvas.fan_in(&[get_posts, get_post], dynamodb, Link::labeled("Read"));
            canvas.fan_in(&[create, update, delete], dynamodb, Link::labeled("Write"));
            canvas.connect(presigned, s3_media);
        })
}

/// Detailed view: endpoints, function sizing and data operations.
pub fn details() -> Diagram {
    DiagramBuilder::new("MyBlog-AWS Architecture Details")
        .file_stem("architecture_details")
        .direction(Direction::TopToBottom)
        .build(|canvas| {
            let (general_user, admin_user) = canvas.cluster("Users", |canvas| {
                (
                    canvas.node(NodeKind::Users, "General Users\n(Public Access)"),
                    canvas.node(NodeKind::User, "Administrator\n(Auth Required)"),
                )
            });

            let (cf_frontend, cf_media) = canvas.cluster("CloudFront Distributions", |canvas| {
                (
                    canvas.node(
                        NodeKind::Cdn,
                        "Frontend Distribution\nd1234567890.cloudfront.net",
                    ),
                    canvas.node(
                        NodeKind::Cdn,
                        "Media Distribution\nd0987654321.cloudfront.net",
                    ),
                )
            });

            let app = canvas.cluster("AppStack - Stateless Resources", |canvas| {
                let s3_frontend = canvas.cluster("Frontend Hosting", |canvas| {
                    canvas.node(NodeKind::Storage, "S3 Bucket\nFrontend Assets\nHTML/CSS/JS")
                });

                let endpoints = canvas.cluster("API Gateway", |canvas| {
                    canvas.node(NodeKind::Api, "REST API\nMyBlog API");

                    let public = canvas.cluster("Public Endpoints", |canvas| {
                        (
                            canvas.node(NodeKind::Api, "/posts"),
                            canvas.node(NodeKind::Api, "/posts/{id}"),
                        )
                    });
                    let admin = canvas.cluster("Admin Endpoints", |canvas| {
                        (
                            canvas.node(NodeKind::Api, "/admin/posts"),
                            canvas.node(NodeKind::Api, "/admin/posts/{id}"),
                            canvas.node(NodeKind::Api, "/admin/presigned-url"),
                        )
                    });
                    (public, admin)
                });

                let functions = canvas.cluster("Lambda Functions", |canvas| {
                    let read = canvas.cluster("Read Operations", |canvas| {
                        (
                            canvas.node(NodeKind::Compute, "get-posts\n128MB/10s\n記事一覧"),
                            canvas.node(NodeKind::Compute, "get-post\n128MB/10s\n記事詳細"),
                        )
                    });
                    let write = canvas.cluster("Write Operations", |canvas| {
                        (
                            canvas.node(NodeKind::Compute, "create-post\n128MB/10s\n記事作成"),
                            canvas.node(NodeKind::Compute, "update-post\n128MB/10s\n記事更新"),
                            canvas.node(NodeKind::Compute, "delete-post\n128MB/10s\n記事削除"),
                        )
                    });
                    let media = canvas.cluster("Media Operations", |canvas| {
                        canvas.node(
                            NodeKind::Compute,
                            "generate-presigned-url\n128MB/10s\nURL生成",
                        )
                    });
                    (read, write, media)
                });

                (s3_frontend, endpoints, functions)
            });
            let (s3_frontend, endpoints, functions) = app;
            let ((ep_posts, ep_post_id), (ep_admin_posts, ep_admin_post_id, ep_presigned)) =
                endpoints;
            let ((get_posts, get_post), (create, update, delete), presigned) = functions;

            let (table, media_bucket, user_pool) =
                canvas.cluster("DataStack - Stateful Resources", |canvas| {
                    let table = canvas.cluster("Database", |canvas| {
                        canvas.node(NodeKind::Database, "DynamoDB Table\nBlogTable\nOn-Demand")
                    });
                    let media_bucket = canvas.cluster("Media Storage", |canvas| {
                        canvas.node(NodeKind::Storage, "S3 Bucket\nMedia Files\nImages/Videos")
                    });
                    let user_pool = canvas.cluster("Authentication", |canvas| {
                        canvas.node(NodeKind::Identity, "Cognito User Pool\nAdmin Auth")
                    });
                    (table, media_bucket, user_pool)
                });

            // Frontend
            canvas.path(general_user).to(cf_frontend).to(s3_frontend);

            // Public API
            canvas.path(general_user).to(ep_posts).to(get_posts);
            canvas.path(general_user).to(ep_post_id).to(get_post);

            // Admin authentication
            canvas.connect(admin_user, user_pool);

            // Admin API
            canvas
                .path(admin_user)
                .to_with(ep_admin_posts, Link::labeled("JWT"))
                .to(get_posts);
            canvas
                .path(admin_user)
                .to_with(ep_admin_post_id, Link::labeled("JWT"))
                .fan_out(&[get_post, update, delete], Link::new());
            canvas
                .path(admin_user)
                .to_with(ep_presigned, Link::labeled("JWT"))
                .to(presigned);

            // Lambda to DynamoDB
            canvas.fan_in(&[get_posts, get_post], table, Link::labeled("Query"));
            canvas.fan_in(
                &[create, update, delete],
                table,
                Link::labeled("TransactWrite"),
            );

            // Lambda and admin to S3
            canvas.connect_with(presigned, media_bucket, Link::labeled("Generate URL"));
            canvas.connect_with(admin_user, media_bucket, Link::labeled("PUT"));

            // Media delivery
            canvas.connect(media_bucket, cf_media);
            canvas.connect(general_user, cf_media);
        })
}

#[cfg(test)]
mod tests {
    use cloudsketch::{Renderer, structure::DiagramGraph};

    use super::*;

    fn node_named(diagram: &Diagram, label: &str) -> cloudsketch::semantic::NodeRef {
        diagram
            .node_refs()
            .find(|&node_ref| diagram.node(node_ref).map(|n| n.label()) == Some(label))
            .unwrap_or_else(|| panic!("no node labeled {label:?}"))
    }

    #[test]
    fn test_overview_shape() {
        let diagram = overview();
        let summary = Renderer::default().summary(&diagram).unwrap();

        assert_eq!(diagram.file_stem(), "architecture_overview");
        assert_eq!(summary.nodes, 15);
        assert_eq!(summary.edges, 18);
        assert_eq!(summary.clusters, 4);
    }

    #[test]
    fn test_overview_api_fans_out_to_every_function() {
        let diagram = overview();
        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        let api = node_named(&diagram, "API Gateway\nREST API");
        let table = node_named(&diagram, "DynamoDB\nBlogTable");

        assert_eq!(graph.out_degree(api), 6);
        assert_eq!(graph.in_degree(table), 5);
    }

    #[test]
    fn test_details_shape() {
        let diagram = details();
        let summary = Renderer::default().summary(&diagram).unwrap();

        assert_eq!(diagram.file_stem(), "architecture_details");
        assert_eq!(summary.nodes, 20);
        assert_eq!(summary.edges, 24);
        assert_eq!(summary.clusters, 15);
    }

    #[test]
    fn test_details_admin_endpoint_fan_out() {
        let diagram = details();
        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        let endpoint = node_named(&diagram, "/admin/posts/{id}");

        assert_eq!(graph.in_degree(endpoint), 1);
        assert_eq!(graph.out_degree(endpoint), 3);
    }

    #[test]
    fn test_details_rest_api_node_is_isolated() {
        let diagram = details();
        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        let rest_api = node_named(&diagram, "REST API\nMyBlog API");

        assert_eq!(graph.isolated(), vec![rest_api]);
    }

    #[test]
    fn test_jwt_labels_only_on_admin_hops() {
        let diagram = details();
        let jwt_edges = diagram
            .edges()
            .iter()
            .filter(|edge| edge.link().label() == Some("JWT"))
            .count();
        assert_eq!(jwt_edges, 3);
    }

    #[test]
    fn test_selection() {
        assert_eq!(select(None).len(), 2);
        assert_eq!(
            select(Some(Selection::Details))[0].file_stem(),
            "architecture_details"
        );
        let stems: Vec<_> = all().iter().map(|d| d.file_stem().to_string()).collect();
        assert_eq!(stems, ["architecture_overview", "architecture_details"]);
    }
}
