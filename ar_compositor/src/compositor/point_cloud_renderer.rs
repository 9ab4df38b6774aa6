/// Feature point visualization

use std::collections::BTreeMap;

use glam::{Mat4, Vec4};

use crate::assets::AssetSource;
use crate::error::{Error, Result};
use crate::graphics_api::PrimitiveTopology;
use crate::render::RenderContext;
use crate::resource::{Framebuffer, Mesh, Shader, VertexBuffer};

const SOURCE: &str = "ar::PointCloudRenderer";

const VERTEX_SHADER: &str = "shaders/point_cloud.vert";
const FRAGMENT_SHADER: &str = "shaders/point_cloud.frag";

const POINT_COLOR: Vec4 = Vec4::new(31.0 / 255.0, 188.0 / 255.0, 210.0 / 255.0, 1.0);
const POINT_SIZE: f32 = 5.0;

/// Tracked feature points of one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Session timestamp; a cloud is re-uploaded only when this advances
    pub timestamp: i64,
    /// x, y, z, confidence per point
    pub points: Vec<f32>,
}

/// Draws a point cloud as one POINTS mesh
pub struct PointCloudRenderer {
    mesh: Mesh,
    shader: Shader,
    last_timestamp: i64,
}

impl PointCloudRenderer {
    pub fn new(ctx: &RenderContext, assets: &dyn AssetSource) -> Result<Self> {
        let mut shader = Shader::from_assets(ctx, assets, VERTEX_SHADER, FRAGMENT_SHADER, &BTreeMap::new())?;
        // Applied on first use, then baked into the program
        shader
            .set_vec4("u_Color", POINT_COLOR)?
            .set_float("u_PointSize", POINT_SIZE)?;

        let points = VertexBuffer::new(ctx, 4, None)?;
        let mesh = Mesh::new(ctx, PrimitiveTopology::Points, None, vec![points])?;
        Ok(Self {
            mesh,
            shader,
            last_timestamp: 0,
        })
    }

    /// Draw `cloud` with `model_view_projection` into `framebuffer` (or the default one)
    pub fn draw(
        &mut self,
        ctx: &mut RenderContext,
        cloud: &PointCloud,
        model_view_projection: Mat4,
        framebuffer: Option<&Framebuffer>,
    ) -> Result<()> {
        if cloud.timestamp > self.last_timestamp {
            self.mesh
                .vertex_buffer_mut(0)
                .ok_or_else(|| Error::InvalidArgument("Point mesh has no vertex stream".to_string()))?
                .set(Some(&cloud.points))?;
            self.last_timestamp = cloud.timestamp;
            crate::ar_trace!(SOURCE, "Uploaded {} points", cloud.points.len() / 4);
        }
        self.shader.set_mat4("u_ModelViewProjection", model_view_projection)?;
        ctx.draw(&self.mesh, &mut self.shader, framebuffer)
    }

    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

#[cfg(test)]
#[path = "point_cloud_renderer_tests.rs"]
mod tests;
