/// Uniforms shared by every pipeline (bind group 0).
pub(crate) const GLOBALS_WGSL: &str = r#"
struct Light {
    // xyz position, w strength
    position: vec4<f32>,
    // x half distance, y ambient
    params: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    lights: array<Light, 3>,
    material_diffuse: vec4<f32>,
    // xyz specular, w shininess
    material_specular: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;
"#;

/// Textured Blinn-Phong surfaces. Mirrors `crate::lighting`.
pub(crate) const LIT_WGSL: &str = r#"
struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    // x texture scale, y opacity
    params: vec4<f32>,
}

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@group(2) @binding(0)
var surface_texture: texture_2d<f32>;
@group(2) @binding(1)
var surface_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct LightFall {
    diffuse: vec3<f32>,
    specular: vec3<f32>,
}

fn safe_normalize(v: vec3<f32>) -> vec3<f32> {
    let len2 = dot(v, v);
    if (len2 > 0.0) {
        return v * inverseSqrt(len2);
    }
    return vec3<f32>(0.0, 0.0, 0.0);
}

fn light_fall(pos: vec3<f32>, n: vec3<f32>, eye: vec3<f32>, light: Light) -> LightFall {
    let to_light = light.position.xyz - pos;
    let hh = light.params.x * light.params.x;
    let atten = light.position.w * hh / (hh + dot(to_light, to_light));
    let l = safe_normalize(to_light);

    let d = max(dot(n, l), 0.0) + light.params.y;

    let v = safe_normalize(eye - pos);
    let h = safe_normalize(l + v);
    let s = pow(max(dot(n, h), 0.0), globals.material_specular.w);

    var fall: LightFall;
    fall.diffuse = light.diffuse.xyz * (d * atten);
    fall.specular = light.specular.xyz * (s * atten);
    return fall;
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = normal_matrix * input.normal;
    out.uv = input.uv;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(surface_texture, surface_sampler, input.uv * object.params.x).rgb;
    let n = safe_normalize(input.normal);
    let eye = globals.eye.xyz;

    var diffuse = vec3<f32>(0.0, 0.0, 0.0);
    var specular = vec3<f32>(0.0, 0.0, 0.0);
    for (var i = 0u; i < 3u; i = i + 1u) {
        let fall = light_fall(input.world_pos, n, eye, globals.lights[i]);
        diffuse = diffuse + fall.diffuse;
        specular = specular + fall.specular;
    }

    let color = (diffuse * globals.material_diffuse.xyz + specular * globals.material_specular.xyz) * texel;
    return vec4<f32>(color, object.params.y);
}
"#;

/// Camera-facing dust sprites with a soft radial falloff.
pub(crate) const SPRITE_WGSL: &str = r#"
struct SpriteInput {
    // xyz centre, w radius
    @location(0) center_radius: vec4<f32>,
    @location(1) color: vec4<f32>,
}

struct SpriteOutput {
    @builtin(position) position: vec4<f32>,
    // sprite coordinate in [-1, 1]
    @location(0) sprite_coord: vec2<f32>,
    @location(1) color: vec3<f32>,
}

@vertex
fn vs_sprite(@builtin(vertex_index) vertex_index: u32, sprite: SpriteInput) -> SpriteOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0)
    );
    let corner = corners[vertex_index % 6u];
    let radius = sprite.center_radius.w;
    let offset = (globals.camera_right.xyz * corner.x + globals.camera_up.xyz * corner.y) * radius;

    var out: SpriteOutput;
    out.position = globals.view_proj * vec4<f32>(sprite.center_radius.xyz + offset, 1.0);
    out.sprite_coord = corner;
    out.color = sprite.color.rgb;
    return out;
}

@fragment
fn fs_sprite(input: SpriteOutput) -> @location(0) vec4<f32> {
    let rsqr = dot(input.sprite_coord, input.sprite_coord);
    if (rsqr > 1.0) {
        discard;
    }
    var a = 1.0 - rsqr;
    a = a * a;
    return vec4<f32>(input.color * a, 1.0);
}
"#;

pub(crate) fn lit_shader_source() -> String {
    format!("{GLOBALS_WGSL}{LIT_WGSL}")
}

pub(crate) fn sprite_shader_source() -> String {
    format!("{GLOBALS_WGSL}{SPRITE_WGSL}")
}
