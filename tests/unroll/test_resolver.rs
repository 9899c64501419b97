// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use content_unroller::{
        Content, ContentMap, ContentResolver, NativeReader, Reader, ReaderError, UnrollEvent,
    };
    use regex::Regex;
    use serde_json::json;
    use std::sync::Arc;

    const ARTICLE_UUID: &str = "22c0d426-1466-11e7-b0c1-37e417ee6c76";
    const MAIN_UUID: &str = "639cd952-149f-11e7-2ea7-a07ecd9ac73f";
    const MEMBER_UUID: &str = "0261ea4a-1474-11e7-1e92-847abda1ac65";
    const PROMO_UUID: &str = "4723cb4e-027c-11e7-ace0-1ce02ef0def9";
    const LEAD_A_UUID: &str = "89f194c8-13bc-11e7-80f4-13e067d5072c";
    const LEAD_B_UUID: &str = "3e96c818-aad8-11e7-93c5-648314d2c72c";
    const DYNAMIC_UUID: &str = "d02886fc-58ff-11e8-9859-6668838a4c10";

    /// Fetch collaborator stub answering each backend from a canned result
    struct StubReader {
        published: Result<ContentMap, ReaderError>,
        internal: Result<ContentMap, ReaderError>,
        native: Result<ContentMap, ReaderError>,
    }

    impl StubReader {
        fn empty() -> Self {
            Self {
                published: Ok(ContentMap::new()),
                internal: Ok(ContentMap::new()),
                native: Ok(ContentMap::new()),
            }
        }
    }

    #[async_trait]
    impl Reader for StubReader {
        async fn get(
            &self,
            _identities: &[String],
            _tid: &str,
        ) -> Result<ContentMap, ReaderError> {
            self.published.clone()
        }

        async fn get_internal(
            &self,
            _identities: &[String],
            _tid: &str,
        ) -> Result<ContentMap, ReaderError> {
            self.internal.clone()
        }

        async fn get_native(
            &self,
            _identities: &[String],
            _tid: &str,
        ) -> Result<ContentMap, ReaderError> {
            self.native.clone()
        }
    }

    fn content_id(uuid: &str) -> String {
        format!("http://api.example.com/content/{}", uuid)
    }

    fn as_content(value: serde_json::Value) -> Content {
        value.as_object().unwrap().clone()
    }

    fn resolver(reader: StubReader) -> ContentResolver {
        ContentResolver::new(
            Arc::new(reader),
            Regex::new("^http://ontology\\.example\\.com/content/(ImageSet|DynamicContent)$")
                .unwrap(),
            "http://api.example.com".to_string(),
        )
    }

    fn event(content: Content) -> UnrollEvent {
        UnrollEvent {
            content,
            tid: "tid_integration".to_string(),
            uuid: ARTICLE_UUID.to_string(),
        }
    }

    fn full_article() -> Content {
        as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "type": "http://ontology.example.com/content/Article",
            "mainImage": {"id": content_id(MAIN_UUID)},
            "alternativeImages": {
                "promotionalImage": {"id": content_id(PROMO_UUID)}
            },
            "bodyXML": format!(
                r#"<body><p>before</p><content data-embedded="true" type="http://ontology.example.com/content/ImageSet" url="{}"></content><p>after</p></body>"#,
                content_id(MAIN_UUID)
            )
        }))
    }

    fn published_batch() -> ContentMap {
        [
            (
                MAIN_UUID.to_string(),
                as_content(json!({
                    "id": content_id(MAIN_UUID),
                    "title": "set title",
                    "members": [
                        {"id": content_id(MEMBER_UUID), "caption": "stub caption"}
                    ]
                })),
            ),
            (
                MEMBER_UUID.to_string(),
                as_content(json!({
                    "id": content_id(MEMBER_UUID),
                    "title": "member title"
                })),
            ),
            (
                PROMO_UUID.to_string(),
                as_content(json!({
                    "id": content_id(PROMO_UUID),
                    "title": "promo title"
                })),
            ),
        ]
        .into()
    }

    #[tokio::test]
    async fn test_unroll_images_end_to_end() {
        let reader = StubReader {
            published: Ok(published_batch()),
            ..StubReader::empty()
        };

        let article = full_article();
        let result = resolver(reader).unroll_images(event(article)).await;

        assert!(result.error.is_none());

        // Main image replaced wholesale, members resolved
        let main = result.content.get("mainImage").unwrap();
        assert_eq!(main.get("title"), Some(&json!("set title")));
        let members = main.get("members").unwrap().as_array().unwrap();
        assert_eq!(
            members[0],
            json!({
                "id": content_id(MEMBER_UUID),
                "caption": "stub caption",
                "title": "member title"
            })
        );

        // Embedded image set spliced into the embeds list
        let embeds = result.content.get("embeds").unwrap().as_array().unwrap();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].get("title"), Some(&json!("set title")));

        // Promotional image replaced in place
        let alt = result.content.get("alternativeImages").unwrap();
        assert_eq!(
            alt.get("promotionalImage").unwrap().get("title"),
            Some(&json!("promo title"))
        );
    }

    #[tokio::test]
    async fn test_unroll_images_example_a_main_image_replacement() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "mainImage": {"id": content_id(MAIN_UUID)}
        }));
        let reader = StubReader {
            published: Ok([(
                MAIN_UUID.to_string(),
                as_content(json!({"id": content_id(MAIN_UUID), "title": "T"})),
            )]
            .into()),
            ..StubReader::empty()
        };

        let result = resolver(reader).unroll_images(event(article)).await;

        assert!(result.error.is_none());
        assert_eq!(
            result.content.get("mainImage"),
            Some(&json!({"id": content_id(MAIN_UUID), "title": "T"}))
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_asymmetry() {
        let failure = || {
            Err(ReaderError::Unreachable {
                service: "content-store-api".to_string(),
                message: "connection refused".to_string(),
            })
        };

        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "mainImage": {"id": content_id(MAIN_UUID)},
            "leadImages": [{"id": content_id(LEAD_A_UUID)}]
        }));

        // Image unrolling surfaces the failure with the original document
        let reader = StubReader {
            published: failure(),
            ..StubReader::empty()
        };
        let images = resolver(reader).unroll_images(event(article.clone())).await;
        assert!(images.error.is_some());
        assert_eq!(images.content, article);

        // Internal unrolling swallows the equivalent failure
        let reader = StubReader {
            published: failure(),
            internal: failure(),
            ..StubReader::empty()
        };
        let internal = resolver(reader)
            .unroll_internal_content(event(article.clone()))
            .await;
        assert!(internal.error.is_none());
        assert_eq!(internal.content, article);
    }

    #[tokio::test]
    async fn test_unroll_internal_content_example_b_partial_lead_images() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "leadImages": [
                {"id": content_id(LEAD_A_UUID)},
                {"id": content_id(LEAD_B_UUID)}
            ]
        }));
        let reader = StubReader {
            published: Ok([(LEAD_A_UUID.to_string(), as_content(json!({"title": "X"})))].into()),
            ..StubReader::empty()
        };

        let result = resolver(reader)
            .unroll_internal_content(event(article))
            .await;

        assert!(result.error.is_none());
        let lead_images = result.content.get("leadImages").unwrap().as_array().unwrap();
        assert_eq!(
            lead_images[0].get("image"),
            Some(&json!({"title": "X"})),
            "resolved lead image must carry the fetched model"
        );
        assert!(
            lead_images[1].get("image").is_none(),
            "unresolved lead image must stay a bare stub"
        );
        assert_eq!(lead_images[1].get("id"), Some(&json!(content_id(LEAD_B_UUID))));
    }

    #[tokio::test]
    async fn test_unroll_internal_content_expands_dynamic_content() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "bodyXML": format!(
                r#"<body><content data-embedded="true" type="http://ontology.example.com/content/DynamicContent" url="{}"></content></body>"#,
                content_id(DYNAMIC_UUID)
            )
        }));
        let reader = StubReader {
            internal: Ok([(
                DYNAMIC_UUID.to_string(),
                as_content(json!({"uuid": DYNAMIC_UUID, "bodyXML": "<body>dynamic</body>"})),
            )]
            .into()),
            ..StubReader::empty()
        };

        let result = resolver(reader)
            .unroll_internal_content(event(article))
            .await;

        assert!(result.error.is_none());
        let embeds = result.content.get("embeds").unwrap().as_array().unwrap();
        assert_eq!(embeds[0].get("uuid"), Some(&json!(DYNAMIC_UUID)));
    }

    #[tokio::test]
    async fn test_documents_without_references_pass_through_both_entry_points() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "title": "nothing to expand",
            "bodyXML": "<body><p>plain text</p></body>"
        }));

        let images = resolver(StubReader::empty())
            .unroll_images(event(article.clone()))
            .await;
        assert!(images.error.is_none());
        assert_eq!(images.content, article);

        let internal = resolver(StubReader::empty())
            .unroll_internal_content(event(article.clone()))
            .await;
        assert!(internal.error.is_none());
        assert_eq!(internal.content, article);
    }

    #[tokio::test]
    async fn test_caller_document_is_never_mutated() {
        let article = full_article();
        let snapshot = article.clone();

        let reader = StubReader {
            published: Ok(published_batch()),
            ..StubReader::empty()
        };
        resolver(reader).unroll_images(event(article.clone())).await;
        assert_eq!(article, snapshot);

        let reader = StubReader {
            published: Ok(published_batch()),
            ..StubReader::empty()
        };
        resolver(reader)
            .unroll_internal_content(event(article.clone()))
            .await;
        assert_eq!(article, snapshot);
    }

    #[tokio::test]
    async fn test_preview_flavor_resolves_through_the_native_path() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "mainImage": {"id": content_id(MAIN_UUID)}
        }));

        let reader = StubReader {
            // Published path would fail; the preview flavor must not use it
            published: Err(ReaderError::UpstreamStatus {
                service: "content-store-api".to_string(),
                status: 404,
            }),
            native: Ok([(
                MAIN_UUID.to_string(),
                as_content(json!({"id": content_id(MAIN_UUID), "title": "native title"})),
            )]
            .into()),
            ..StubReader::empty()
        };

        let preview_resolver = ContentResolver::new(
            Arc::new(NativeReader::new(Arc::new(reader))),
            Regex::new("^http://ontology\\.example\\.com/content/(ImageSet|DynamicContent)$")
                .unwrap(),
            "http://api.example.com".to_string(),
        );

        let result = preview_resolver.unroll_images(event(article)).await;

        assert!(result.error.is_none());
        assert_eq!(
            result.content.get("mainImage").unwrap().get("title"),
            Some(&json!("native title"))
        );
    }

    #[tokio::test]
    async fn test_missing_set_is_substituted_with_minimal_stub() {
        let article = as_content(json!({
            "id": content_id(ARTICLE_UUID),
            "mainImage": {"id": content_id(MAIN_UUID)}
        }));

        let result = resolver(StubReader::empty()).unroll_images(event(article)).await;

        assert!(result.error.is_none());
        assert_eq!(
            result.content.get("mainImage"),
            Some(&json!({"id": content_id(MAIN_UUID)}))
        );
    }
}
