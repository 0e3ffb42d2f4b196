//! Filter graph used for post-decode transforms.

use std::ptr;

use crate::dict::to_cstring;
use crate::error::{check, FfmpegError, Result};
use crate::handle::Owned;
use ffmpeg_sys::*;
use tracing::debug;

/// RAII wrapper for AVFilterGraph.
///
/// The underlying graph can be swapped for an empty one with
/// [`reset`](Self::reset) without giving callers a new handle.
#[derive(Debug)]
pub struct FilterGraph(Owned<AVFilterGraph>);

impl FilterGraph {
    pub fn new() -> Result<Self> {
        Owned::alloc(|| unsafe { avfilter_graph_alloc() }).map(Self)
    }

    pub fn as_ptr(&self) -> *const AVFilterGraph {
        self.0.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVFilterGraph {
        self.0.as_ptr()
    }

    /// Replace the graph with a freshly allocated, empty one.
    ///
    /// Filter contexts created in the old graph are invalid afterwards. If
    /// the new graph cannot be allocated the old one is kept.
    pub fn reset(&mut self) -> Result<()> {
        let dropped = self.nb_filters();
        self.0.replace(|| unsafe { avfilter_graph_alloc() })?;
        debug!(dropped, "Filter graph reset");
        Ok(())
    }

    pub fn nb_filters(&self) -> usize {
        unsafe { (*self.0.as_ptr()).nb_filters as usize }
    }

    /// Create an instance of filter `filter` named `instance` in the graph.
    pub fn create_filter(
        &mut self,
        filter: &str,
        instance: &str,
        args: Option<&str>,
    ) -> Result<*mut AVFilterContext> {
        let filter_c = to_cstring(filter, "filter")?;
        let definition = unsafe { avfilter_get_by_name(filter_c.as_ptr()) };
        if definition.is_null() {
            return Err(FfmpegError::FilterConfig(format!(
                "filter '{}' not found",
                filter
            )));
        }

        let instance_c = to_cstring(instance, "filter instance")?;
        let args_c = args.map(|a| to_cstring(a, "filter arguments")).transpose()?;

        let mut ctx: *mut AVFilterContext = ptr::null_mut();
        check(
            unsafe {
                avfilter_graph_create_filter(
                    &mut ctx,
                    definition,
                    instance_c.as_ptr(),
                    args_c.as_ref().map_or(ptr::null(), |a| a.as_ptr()),
                    ptr::null_mut(),
                    self.0.as_ptr(),
                )
            },
            "avfilter_graph_create_filter",
        )?;
        Ok(ctx)
    }
}
