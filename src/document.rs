//! A compiled widget tree together with the readiness state of its images.

use std::collections::BTreeMap;

use futures::future::join_all;
use log::debug;

use crate::image::{ImageHandle, ImageRequest, ImageResolver, ImageState};
use crate::style::{Style, StyleKey};
use crate::widget::{ContainerWidget, ImageId, ImageWidget, TextContent, TextWidget, Widget};

/// Mounted document. Dropping it tears down every outstanding image query.
#[derive(Debug)]
pub struct RenderedDocument {
    root: Widget,
    images: BTreeMap<ImageId, ImageHandle>,
}

impl RenderedDocument {
    /// A single unstyled container with no children.
    pub fn empty() -> Self {
        Self {
            root: Widget::container(Style::new(), Vec::new()),
            images: BTreeMap::new(),
        }
    }

    /// Start resolving every image in `root`. Without a resolver, only images
    /// with both explicit dimensions ever become Ready.
    pub fn mount(root: Widget, resolver: Option<&ImageResolver>) -> Self {
        let images = root
            .images()
            .into_iter()
            .map(|img| {
                let request = ImageRequest::from(img);
                let handle = match resolver {
                    Some(resolver) => resolver.resolve(request),
                    None => ImageHandle::without_source(&request),
                };
                (img.id, handle)
            })
            .collect::<BTreeMap<_, _>>();
        debug!("mounted document with {} image(s)", images.len());
        Self { root, images }
    }

    /// The compiled tree as emitted by the compiler.
    pub fn root(&self) -> &Widget {
        &self.root
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn image_state(&self, id: ImageId) -> Option<ImageState> {
        self.images.get(&id).map(ImageHandle::state)
    }

    pub fn image_states(&self) -> Vec<(ImageId, ImageState)> {
        self.images
            .iter()
            .map(|(id, handle)| (*id, handle.state()))
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.images.values().all(ImageHandle::is_ready)
    }

    /// Wait for every image to leave Pending. Hanging queries keep this
    /// future pending, so callers usually wrap it in a timeout.
    pub async fn settle(&mut self) {
        join_all(self.images.values_mut().map(|handle| handle.settled())).await;
    }

    /// Cancel all outstanding image queries.
    pub fn teardown(&mut self) {
        for handle in self.images.values_mut() {
            handle.cancel();
        }
    }

    /// The tree as it should be displayed right now: a Pending or Failed
    /// image is an empty text placeholder, a Ready image carries its size.
    pub fn snapshot(&self) -> Widget {
        self.materialize(&self.root)
    }

    fn materialize(&self, widget: &Widget) -> Widget {
        match widget {
            Widget::Image(img) => match self.image_state(img.id) {
                Some(ImageState::Ready(size)) => Widget::Image(ImageWidget {
                    width: Some(size.width),
                    height: Some(size.height),
                    style: img
                        .style
                        .clone()
                        .with(StyleKey::Width, size.width)
                        .with(StyleKey::Height, size.height),
                    ..img.clone()
                }),
                _ => Widget::placeholder(),
            },
            Widget::Container(c) => Widget::Container(ContainerWidget {
                style: c.style.clone(),
                children: c.children.iter().map(|w| self.materialize(w)).collect(),
            }),
            Widget::Text(text) => match &text.content {
                TextContent::Literal(_) => widget.clone(),
                TextContent::Spans(spans) => Widget::Text(TextWidget {
                    style: text.style.clone(),
                    content: TextContent::Spans(
                        spans.iter().map(|w| self.materialize(w)).collect(),
                    ),
                    action: text.action.clone(),
                }),
            },
            Widget::LineBreak => Widget::LineBreak,
        }
    }
}

impl Default for RenderedDocument {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageSize;
    use crate::platform::StaticImageSizeSource;
    use std::sync::Arc;
    use std::time::Duration;

    fn image(id: usize, uri: &str, width: Option<f32>, height: Option<f32>) -> Widget {
        Widget::Image(ImageWidget {
            id: ImageId(id),
            uri: uri.to_string(),
            width,
            height,
            style: Style::new(),
        })
    }

    #[test]
    fn empty_document_is_bare_container() {
        let doc = RenderedDocument::empty();
        assert_eq!(doc.root(), &Widget::container(Style::new(), vec![]));
        assert_eq!(doc.image_count(), 0);
        assert!(doc.is_ready());
    }

    #[test]
    fn pending_images_render_as_placeholders() {
        let root = Widget::container(
            Style::new(),
            vec![image(0, "a.png", None, None), image(1, "b.png", Some(4.0), Some(3.0))],
        );
        let doc = RenderedDocument::mount(root, None);
        let snap = doc.snapshot();
        assert_eq!(snap.children()[0], Widget::placeholder());
        match &snap.children()[1] {
            Widget::Image(img) => {
                assert_eq!(img.width, Some(4.0));
                assert_eq!(img.style.dimension(StyleKey::Height), Some(3.0));
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert!(!doc.is_ready());
    }

    #[tokio::test]
    async fn settle_resolves_nested_images() {
        let source = StaticImageSizeSource::new().with_size("a.png", 30, 60);
        let resolver = ImageResolver::new(Arc::new(source), 3.0).unwrap();
        let root = Widget::container(
            Style::new(),
            vec![Widget::Text(TextWidget::spans(
                Style::new(),
                vec![image(0, "a.png", None, None)],
            ))],
        );
        let mut doc = RenderedDocument::mount(root, Some(&resolver));
        tokio::time::timeout(Duration::from_secs(1), doc.settle())
            .await
            .expect("settles");
        assert_eq!(
            doc.image_state(ImageId(0)),
            Some(ImageState::Ready(ImageSize { width: 10.0, height: 20.0 }))
        );
        let snap = doc.snapshot();
        let span = &snap.children()[0].children()[0];
        match span {
            Widget::Image(img) => assert_eq!((img.width, img.height), (Some(10.0), Some(20.0))),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn teardown_keeps_images_pending() {
        let source = StaticImageSizeSource::new()
            .with_size("a.png", 10, 10)
            .with_delay(Duration::from_millis(30));
        let resolver = ImageResolver::new(Arc::new(source), 1.0).unwrap();
        let mut doc = RenderedDocument::mount(image(0, "a.png", None, None), Some(&resolver));
        doc.teardown();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(doc.image_state(ImageId(0)), Some(ImageState::Pending));
    }
}
