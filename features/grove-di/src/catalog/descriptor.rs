use std::{fmt::Debug, sync::Arc};

use crate::{
    catalog::annotation::{Annotation, AnnotationKind},
    processor::BeanPostProcessor,
    resolver::Args,
    types::{DynError, Injectable, Instance, TypeInfo},
};

pub type ConstructorFn = Arc<dyn Fn(&Args) -> Result<Instance, DynError> + Send + Sync>;
pub type MethodFn =
    Arc<dyn Fn(&Instance, &Args) -> Result<Option<Instance>, DynError> + Send + Sync>;
pub type FieldSetter = Arc<dyn Fn(&Instance, Instance) -> Result<(), DynError> + Send + Sync>;
pub type PostProcessorCast =
    Arc<dyn Fn(&Instance) -> Option<Arc<dyn BeanPostProcessor>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Annotation,
    Enum,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Package,
    Private,
}

fn receiver<Receiver: Injectable>(instance: &Instance) -> Result<Arc<Receiver>, DynError> {
    instance.downcast::<Receiver>().map_err(|actual| {
        format!(
            "receiver is '{actual}' but '{}' was expected",
            std::any::type_name::<Receiver>()
        )
        .into()
    })
}

/// A constructor, factory method or setter parameter
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: TypeInfo,
    pub annotations: Vec<Annotation>,
}

impl ParamDescriptor {
    /// Parameter without any marker
    pub fn new<T: ?Sized + 'static>(name: &str) -> Self {
        ParamDescriptor {
            name: name.to_string(),
            ty: TypeInfo::of::<T>(),
            annotations: Vec::new(),
        }
    }

    /// Required dependency of type `T`
    pub fn autowired<T: ?Sized + 'static>(name: &str) -> Self {
        Self::new::<T>(name).annotate(Annotation::autowired())
    }

    /// Value of type `T` read from the property source
    pub fn value<T: ?Sized + 'static>(name: &str, key: &str) -> Self {
        Self::new::<T>(name).annotate(Annotation::value(key))
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

pub struct ConstructorDescriptor {
    pub visibility: Visibility,
    pub params: Vec<ParamDescriptor>,
    invoker: ConstructorFn,
}
impl Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish()
    }
}

impl ConstructorDescriptor {
    pub fn new<T, F>(constructor: F) -> Self
    where
        T: Injectable,
        F: Fn(&Args) -> Result<T, DynError> + Send + Sync + 'static,
    {
        ConstructorDescriptor {
            visibility: Visibility::Public,
            params: Vec::new(),
            invoker: Arc::new(move |args| constructor(args).map(Instance::new)),
        }
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn invoke(&self, args: &Args) -> Result<Instance, DynError> {
        (self.invoker)(args)
    }
}

pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<Annotation>,
    pub params: Vec<ParamDescriptor>,
    pub returns: TypeInfo,
    /// `None` for a method without a body
    invoker: Option<MethodFn>,
}
impl Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns.type_name)
            .field("abstract", &self.invoker.is_none())
            .finish()
    }
}

impl MethodDescriptor {
    /// General method on `Receiver`
    pub fn new<Receiver, F>(name: &str, method: F) -> Self
    where
        Receiver: Injectable,
        F: Fn(&Receiver, &Args) -> Result<Option<Instance>, DynError> + Send + Sync + 'static,
    {
        let invoker: MethodFn = Arc::new(move |instance, args| {
            let this = receiver::<Receiver>(instance)?;
            method(&this, args)
        });
        MethodDescriptor {
            name: name.to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            params: Vec::new(),
            returns: TypeInfo::of::<()>(),
            invoker: Some(invoker),
        }
    }

    /// Method without a body
    pub fn declared(name: &str) -> Self {
        MethodDescriptor {
            name: name.to_string(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            params: Vec::new(),
            returns: TypeInfo::of::<()>(),
            invoker: None,
        }
    }

    /// `@Bean` factory method on the configuration type `Owner` producing a `T`
    pub fn factory<Owner, T, F>(name: &str, factory: F) -> Self
    where
        Owner: Injectable,
        T: Injectable,
        F: Fn(&Owner, &Args) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Self::new::<Owner, _>(name, move |owner, args| {
            factory(owner, args).map(|product| Some(Instance::new(product)))
        })
        .returns::<T>()
        .annotate(Annotation::bean())
    }

    /// Zero argument method, used for lifecycle callbacks
    pub fn hook<Receiver, F>(name: &str, hook: F) -> Self
    where
        Receiver: Injectable,
        F: Fn(&Receiver) -> Result<(), DynError> + Send + Sync + 'static,
    {
        Self::new::<Receiver, _>(name, move |this, _| hook(this).map(|_| None))
    }

    /// Single argument method receiving a `V`
    pub fn setter<Receiver, V, F>(name: &str, setter: F) -> Self
    where
        Receiver: Injectable,
        V: Injectable,
        F: Fn(&Receiver, Arc<V>) -> Result<(), DynError> + Send + Sync + 'static,
    {
        Self::new::<Receiver, _>(name, move |this, args| {
            setter(this, args.bean::<V>(0)?).map(|_| None)
        })
        .param(ParamDescriptor::new::<V>("value"))
    }

    pub fn returns<T: ?Sized + 'static>(mut self) -> Self {
        self.returns = TypeInfo::of::<T>();
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        // A method carries each marker at most once, later ones win
        let kind = annotation.kind();
        self.annotations.retain(|existing| existing.kind() != kind);
        self.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn final_member(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.invoker.is_none()
    }

    pub fn invoke(&self, target: &Instance, args: &Args) -> Result<Option<Instance>, DynError> {
        match &self.invoker {
            Some(invoker) => invoker(target, args),
            None => Err(format!("method '{}' has no body", self.name).into()),
        }
    }
}

pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeInfo,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<Annotation>,
    setter: FieldSetter,
}
impl Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty.type_name)
            .finish()
    }
}

impl FieldDescriptor {
    /// Field of type `V` on `Receiver`, written through `setter`
    ///
    /// Instances are shared, so the receiver needs interior mutability (`OnceLock`, `Mutex`, ...)
    pub fn new<Receiver, V, F>(name: &str, setter: F) -> Self
    where
        Receiver: Injectable,
        V: Injectable,
        F: Fn(&Receiver, Arc<V>) -> Result<(), DynError> + Send + Sync + 'static,
    {
        let setter: FieldSetter = Arc::new(move |instance, value| {
            let this = receiver::<Receiver>(instance)?;
            let value = value.downcast::<V>().map_err(|actual| {
                format!(
                    "value is '{actual}' but '{}' was expected",
                    std::any::type_name::<V>()
                )
            })?;
            setter(&this, value)
        });
        Self::raw(name, TypeInfo::of::<V>(), setter)
    }

    /// Field with a declared type that differs from what the setter receives, e.g. `dyn Trait`
    pub fn raw(name: &str, ty: TypeInfo, setter: FieldSetter) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            ty,
            is_static: false,
            is_final: false,
            annotations: Vec::new(),
            setter,
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn final_member(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn set(&self, target: &Instance, value: Instance) -> Result<(), DynError> {
        (self.setter)(target, value)
    }
}

/// Everything the container may ask about a type
pub struct TypeDescriptor {
    pub info: TypeInfo,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub superclass: Option<TypeInfo>,
    pub interfaces: Vec<TypeInfo>,
    pub annotations: Vec<Annotation>,
    pub constructors: Vec<Arc<ConstructorDescriptor>>,
    pub methods: Vec<Arc<MethodDescriptor>>,
    pub fields: Vec<Arc<FieldDescriptor>>,
    post_processor: Option<PostProcessorCast>,
}
impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.info.type_name)
            .field("kind", &self.kind)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

impl TypeDescriptor {
    fn of_kind<T: ?Sized + 'static>(kind: TypeKind) -> Self {
        TypeDescriptor {
            info: TypeInfo::of::<T>(),
            kind,
            visibility: Visibility::Public,
            is_abstract: matches!(kind, TypeKind::Interface),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            post_processor: None,
        }
    }

    pub fn class<T: ?Sized + 'static>() -> Self {
        Self::of_kind::<T>(TypeKind::Class)
    }

    /// A trait, usually given as `dyn Trait`
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::of_kind::<T>(TypeKind::Interface)
    }

    pub fn annotation<T: ?Sized + 'static>() -> Self {
        Self::of_kind::<T>(TypeKind::Annotation)
    }

    pub fn enumeration<T: ?Sized + 'static>() -> Self {
        Self::of_kind::<T>(TypeKind::Enum)
    }

    pub fn record<T: ?Sized + 'static>() -> Self {
        Self::of_kind::<T>(TypeKind::Record)
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn component(self) -> Self {
        self.annotate(Annotation::Component(None))
    }

    pub fn component_named(self, name: &str) -> Self {
        self.annotate(Annotation::Component(Some(name.to_string())))
    }

    pub fn configuration(self) -> Self {
        self.annotate(Annotation::Configuration(None))
    }

    pub fn order(self, order: i32) -> Self {
        self.annotate(Annotation::Order(order))
    }

    pub fn primary(self) -> Self {
        self.annotate(Annotation::Primary)
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn extends<S: ?Sized + 'static>(mut self) -> Self {
        self.superclass = Some(TypeInfo::of::<S>());
        self
    }

    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.interfaces.push(TypeInfo::of::<I>());
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(Arc::new(constructor));
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    /// Marks instances of this type as bean post processors
    pub fn post_processor<P: BeanPostProcessor + Injectable>(mut self) -> Self {
        self.post_processor = Some(Arc::new(|instance| {
            instance
                .downcast::<P>()
                .ok()
                .map(|processor| processor as Arc<dyn BeanPostProcessor>)
        }));
        self
    }

    pub fn is_post_processor(&self) -> bool {
        self.post_processor.is_some()
    }

    /// Views the instance as a post processor, `None` if it is not one
    pub fn as_post_processor(&self, instance: &Instance) -> Option<Arc<dyn BeanPostProcessor>> {
        self.post_processor
            .as_ref()
            .and_then(|cast| cast(instance))
    }

    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotations
            .iter()
            .any(|annotation| annotation.kind() == kind)
    }

    /// Zero argument method with the given name
    pub fn find_method(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.params.is_empty())
    }
}
