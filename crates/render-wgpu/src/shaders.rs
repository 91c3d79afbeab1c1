use cadence_render::ShaderSource;

/// Phong shading with one point, one spot and one directional light, all in
/// view space. Matrices arrive in OpenGL clip convention and depth is remapped
/// to `[0, w]` in the vertex stage.
pub const SCENE_SHADER: &str = r#"
struct PointLight {
    color: vec3<f32>,
    intensity: f32,
    position: vec3<f32>,
    att_constant: f32,
    att_linear: f32,
    att_exponent: f32,
}

struct SpotLight {
    point: PointLight,
    cone_direction: vec3<f32>,
    cutoff: f32,
}

struct DirectionalLight {
    color: vec3<f32>,
    intensity: f32,
    direction: vec3<f32>,
}

struct Uniforms {
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    ambient_light: vec3<f32>,
    specular_power: f32,
    texture_sampler: i32,
    has_texture: i32,
    reflectance: f32,
    material_ambient: vec4<f32>,
    material_diffuse: vec4<f32>,
    material_specular: vec4<f32>,
    point_light: PointLight,
    spot_light: SpotLight,
    directional_light: DirectionalLight,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(1) @binding(0) var t_diffuse: texture_2d<f32>;
@group(1) @binding(1) var s_diffuse: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coord: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
    @location(1) mv_normal: vec3<f32>,
    @location(2) mv_position: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let mv_position = u.model_view * vec4<f32>(in.position, 1.0);
    var clip = u.projection * mv_position;
    clip.z = (clip.z + clip.w) * 0.5;
    out.clip_position = clip;
    out.tex_coord = in.tex_coord;
    out.mv_normal = normalize((u.model_view * vec4<f32>(in.normal, 0.0)).xyz);
    out.mv_position = mv_position.xyz;
    return out;
}

fn light_color(
    color: vec3<f32>,
    intensity: f32,
    position: vec3<f32>,
    to_light: vec3<f32>,
    normal: vec3<f32>,
    diffuse_c: vec4<f32>,
    specular_c: vec4<f32>,
) -> vec4<f32> {
    let diffuse_factor = max(dot(normal, to_light), 0.0);
    let diffuse = diffuse_c * vec4<f32>(color, 1.0) * intensity * diffuse_factor;

    let camera_direction = normalize(-position);
    let reflected = normalize(reflect(-to_light, normal));
    let specular_factor = pow(max(dot(camera_direction, reflected), 0.0), u.specular_power);
    let specular = specular_c * vec4<f32>(color, 1.0) * intensity * specular_factor * u.reflectance;
    return diffuse + specular;
}

fn point_light(
    light: PointLight,
    position: vec3<f32>,
    normal: vec3<f32>,
    diffuse_c: vec4<f32>,
    specular_c: vec4<f32>,
) -> vec4<f32> {
    let light_direction = light.position - position;
    let to_light = normalize(light_direction);
    let color = light_color(light.color, light.intensity, position, to_light, normal, diffuse_c, specular_c);
    let dist = length(light_direction);
    let attenuation = light.att_constant + light.att_linear * dist
        + light.att_exponent * dist * dist;
    return color / max(attenuation, 1e-4);
}

fn spot_light(
    light: SpotLight,
    position: vec3<f32>,
    normal: vec3<f32>,
    diffuse_c: vec4<f32>,
    specular_c: vec4<f32>,
) -> vec4<f32> {
    let from_light = normalize(position - light.point.position);
    let alpha = dot(from_light, normalize(light.cone_direction));
    var color = vec4<f32>(0.0);
    if alpha > light.cutoff {
        color = point_light(light.point, position, normal, diffuse_c, specular_c);
        color = color * (1.0 - (1.0 - alpha) / (1.0 - light.cutoff));
    }
    return color;
}

fn directional_light(
    light: DirectionalLight,
    position: vec3<f32>,
    normal: vec3<f32>,
    diffuse_c: vec4<f32>,
    specular_c: vec4<f32>,
) -> vec4<f32> {
    return light_color(light.color, light.intensity, position, normalize(light.direction), normal, diffuse_c, specular_c);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(t_diffuse, s_diffuse, in.tex_coord);
    var ambient_c = u.material_ambient;
    var diffuse_c = u.material_diffuse;
    var specular_c = u.material_specular;
    if u.has_texture == 1 {
        ambient_c = sampled;
        diffuse_c = sampled;
        specular_c = sampled;
    }

    let normal = normalize(in.mv_normal);
    var lit = directional_light(u.directional_light, in.mv_position, normal, diffuse_c, specular_c);
    lit += point_light(u.point_light, in.mv_position, normal, diffuse_c, specular_c);
    lit += spot_light(u.spot_light, in.mv_position, normal, diffuse_c, specular_c);

    return clamp(ambient_c * vec4<f32>(u.ambient_light, 1.0) + lit, vec4<f32>(0.0), vec4<f32>(1.0));
}
"#;

/// Source for the frame renderer's program; both stages live in one module.
pub fn scene_shader() -> ShaderSource {
    ShaderSource::new("scene", SCENE_SHADER, SCENE_SHADER)
}
