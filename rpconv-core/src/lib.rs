/// 模型文件写入的目标格式版本。
pub const TARGET_FORMAT_VERSION: &str = "1.21.11";

pub mod rotation {
    use serde_json::{Map, Value, json};

    const ANGLE_KEY: &str = "angle";
    const AXIS_KEY: &str = "axis";
    const ORIGIN_KEY: &str = "origin";

    /// 旋转轴，对应旧格式中 `axis` 字段的三个取值。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Axis {
        X,
        Y,
        Z,
    }

    impl Axis {
        pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

        pub fn parse(value: &Value) -> Option<Self> {
            match value.as_str()? {
                "x" => Some(Axis::X),
                "y" => Some(Axis::Y),
                "z" => Some(Axis::Z),
                _ => None,
            }
        }

        #[inline]
        pub fn key(self) -> &'static str {
            match self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        }
    }

    /// 新格式判定：只要存在任一轴字段即视为新格式。
    pub fn is_current_form(rotation: &Value) -> bool {
        rotation
            .as_object()
            .is_some_and(|map| Axis::ALL.iter().any(|axis| map.contains_key(axis.key())))
    }

    /// 将旧格式旋转（`angle` + `axis` + 可选 `origin`）转换为按轴分量表示的新格式。
    ///
    /// 非对象、已是新格式、缺少 `angle`/`axis` 或轴名无法识别时原样返回。
    pub fn convert_rotation(rotation: Value) -> Value {
        if is_current_form(&rotation) {
            return rotation;
        }
        let migrated = rotation.as_object().and_then(migrate_legacy);
        migrated.unwrap_or(rotation)
    }

    fn migrate_legacy(map: &Map<String, Value>) -> Option<Value> {
        let angle = map.get(ANGLE_KEY)?;
        let axis = Axis::parse(map.get(AXIS_KEY)?)?;
        let origin = map
            .get(ORIGIN_KEY)
            .cloned()
            .unwrap_or_else(|| json!([0, 0, 0]));

        let mut converted = Map::new();
        converted.insert(ORIGIN_KEY.to_string(), origin);
        for candidate in Axis::ALL {
            let value = if candidate == axis {
                angle.clone()
            } else {
                json!(0)
            };
            converted.insert(candidate.key().to_string(), value);
        }
        Some(Value::Object(converted))
    }

}

pub mod model {
    use serde_json::Value;

    use crate::rotation::{convert_rotation, is_current_form};

    const FORMAT_VERSION_KEY: &str = "format_version";
    const ELEMENTS_KEY: &str = "elements";
    const ROTATION_KEY: &str = "rotation";

    /// 单个模型文档转换后的变更统计。
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ModelChanges {
        pub version_updated: bool,
        pub rotations_migrated: usize,
    }

    /// 原地转换模型文档：覆盖已有的 `format_version`，并迁移 `elements[*].rotation`。
    pub fn convert_model_in_place(model: &mut Value, target_version: &str) -> ModelChanges {
        let mut changes = ModelChanges::default();
        let Some(map) = model.as_object_mut() else {
            return changes;
        };

        if let Some(version) = map.get_mut(FORMAT_VERSION_KEY) {
            *version = Value::String(target_version.to_string());
            changes.version_updated = true;
        }

        if let Some(Value::Array(elements)) = map.get_mut(ELEMENTS_KEY) {
            for element in elements.iter_mut().filter_map(Value::as_object_mut) {
                let Some(rotation) = element.get_mut(ROTATION_KEY) else {
                    continue;
                };
                let was_current = is_current_form(rotation);
                *rotation = convert_rotation(rotation.take());
                if !was_current && is_current_form(rotation) {
                    changes.rotations_migrated += 1;
                }
            }
        }

        changes
    }

    /// 按值转换模型文档，便于链式调用。
    pub fn convert_model(mut model: Value, target_version: &str) -> Value {
        convert_model_in_place(&mut model, target_version);
        model
    }

}
